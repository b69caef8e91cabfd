//! Voice track layout CLI library.
//!
//! This crate provides the CLI interface for track layout.

mod cli;
pub mod commands;
mod config;
pub mod records;

pub use cli::{Cli, Commands, LayoutArgs, ValidateArgs};
pub use config::Config;
