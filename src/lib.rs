//! gohugo - drive the Hugo static site generator.
//!
//! Wraps the `hugo` executable: version, new site, new content, theme
//! installation, the dev server and production builds.

pub mod commands;
pub mod config;
pub mod display;
pub mod hugo;
pub mod server;
pub mod theme;
pub mod ui;
