//! CLI surface: argument parsing, commands and display helpers

pub mod commands;
pub mod display;
pub mod stack;

pub use commands::CliArgs;
