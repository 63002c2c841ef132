//! Configuration module.

mod loader;
mod patch;
mod types;

pub use loader::*;
pub use patch::*;
pub use types::*;
