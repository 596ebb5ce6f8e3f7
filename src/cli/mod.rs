//! Command-line interface
//!
//! This module contains the argument parsing for the node binary.

pub mod commands;

pub use commands::Opt;
