//! # Bitshift Chain - A Minimal Proof-of-Work Node
//!
//! This is my small proof-of-work chain node. It mines blocks against a fixed
//! difficulty, checks blocks that peers send it, and passes new blocks on.
//!
//! ## What I Built
//! - **Block Codec**: fixed 81-byte header plus a length-prefixed payload, hashed with SHA-256
//! - **Difficulty**: a bit-shift parameter turned into a 256-bit target
//! - **Validation**: timestamp, linkage, payload hash, difficulty and work checks
//! - **P2P Network**: TCP peers speaking a two-message binary protocol
//! - **Node Loop**: one thread that owns the chain and never blocks mining
//!
//! ## How I Organized My Code
//! - `core/`: blocks, difficulty target, validation, nonce search, the chain
//! - `network/`: wire protocol, peer sessions, peer set, node loop, server
//! - `config/`: settings from defaults, TOML file, environment and CLI
//! - `utils/`: hashing and clock helpers
//! - `cli/`: command-line arguments
//!
//! ## Key Design Decisions I Made
//! - The chain lives only in memory; there is no storage layer
//! - Only the node loop touches the chain, so it needs no locks
//! - Peers join and leave by sending events to the node loop
//! - A rejected block is just `false`; the reason only shows up in debug logs
//!
//! ## When I Need to Understand Something
//! 1. Start with `network/node.rs` to see the priority loop
//! 2. Look at `core/block.rs` for the exact byte layout
//! 3. Check `core/validation.rs` for the acceptance rules
//! 4. Review `network/server.rs` for how connections become peers

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use crate::cli::Opt;
pub use crate::config::Config;
pub use crate::core::{
    calculate_target, compare, meets_target, validate, Block, BlockHeader, Chain, ProofOfWork,
    Rejection, BLOCK_HEADER_LEN, MAX_PAYLOAD_LEN,
};
pub use crate::error::{NodeError, Result};
pub use crate::network::{
    read_message, send_block, send_chain_sync_request, Message, Node, NodeEvent, PeerSession,
    Server, ShutdownHandle, StepOutcome,
};
pub use crate::utils::{current_timestamp, hash_to_hex, sha256_digest, Hash};
