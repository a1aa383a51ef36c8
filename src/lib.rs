//! Install, uninstall and launch tooling for Klack

pub mod common;
pub mod config;
pub mod desktop_entry;
pub mod install;
pub mod launcher;
pub mod prompt;
pub mod refresh;
pub mod uninstall;
