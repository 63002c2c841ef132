//! Hugo process spawning, output channels and output classification.

pub mod parse;
mod process;
mod stream;

pub use process::*;
pub use stream::*;
