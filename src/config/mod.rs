//! Configuration management
//!
//! This module handles the node settings: listen address, seed peer,
//! difficulty, mined payload and socket timeouts.

pub mod settings;

pub use settings::Config;
