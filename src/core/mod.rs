//! Core chain functionality
//!
//! This module contains the block codec, the difficulty target maths, block
//! validation, the nonce search and the in-memory chain.

pub mod block;
pub mod chain;
pub mod difficulty;
pub mod proof_of_work;
pub mod validation;

pub use block::{Block, BlockHeader, BLOCK_HEADER_LEN, MAX_PAYLOAD_LEN, PAYLOAD_LEN_PREFIX};
pub use chain::{Chain, EMPTY_CHAIN_HEAD};
pub use difficulty::{calculate_target, compare, meets_target};
pub use proof_of_work::ProofOfWork;
pub use validation::{check_block, validate, Rejection};
