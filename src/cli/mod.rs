//! Command-line interface module
//!
//! Handles argument parsing and the load-and-render command

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
