//! Utility functions and helpers
//!
//! Hashing and clock helpers shared by the codec, the validator and the miner.

pub mod crypto;

pub use crypto::{current_timestamp, hash_to_hex, sha256_digest, Hash, HASH_LEN};
