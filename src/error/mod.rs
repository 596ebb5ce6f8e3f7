//! Error handling for the node
//!
//! This module provides the error types shared by the codec, the network layer
//! and configuration loading. Block validation does not use these errors: a
//! rejected block is a plain `false`, see `core::validation`.

use std::fmt;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Error types for node operations
#[derive(Debug, Clone)]
pub enum NodeError {
    /// Network communication errors
    Network(String),
    /// File and socket I/O errors
    Io(String),
    /// Configuration errors
    Config(String),
    /// Structurally invalid block (e.g. broken chain linkage)
    InvalidBlock(String),
    /// Payload does not fit the 16-bit length prefix
    PayloadTooLarge { len: usize },
    /// System clock errors
    Clock(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Network(msg) => write!(f, "Network error: {msg}"),
            NodeError::Io(msg) => write!(f, "I/O error: {msg}"),
            NodeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            NodeError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            NodeError::PayloadTooLarge { len } => write!(
                f,
                "Payload too large: {len} bytes (max {})",
                crate::core::MAX_PAYLOAD_LEN
            ),
            NodeError::Clock(msg) => write!(f, "Clock error: {msg}"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for NodeError {
    fn from(err: toml::de::Error) -> Self {
        NodeError::Config(err.to_string())
    }
}
