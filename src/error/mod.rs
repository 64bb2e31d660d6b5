//! Error handling module
//!
//! Defines the error taxonomy with appropriate exit codes

pub mod types;

pub use types::*;
