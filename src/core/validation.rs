//! Block validation against the current chain head
//!
//! The public boundary is [`validate`], which only answers accept or reject.
//! [`check_block`] runs the same checks and reports which one failed so the
//! node can log the reason.

use crate::core::difficulty::{calculate_target, meets_target};
use crate::core::Block;
use crate::utils::{current_timestamp, sha256_digest, Hash};
use log::{debug, warn};
use std::fmt;

/// Why a candidate block was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Timestamp lies ahead of the local clock
    FutureTimestamp,
    /// Previous hash does not point at the current head
    BadLinkage,
    /// Data hash does not match the payload
    BadPayloadHash,
    /// Declared bit shift differs from the node's difficulty
    BadDifficulty,
    /// Header hash is not below the target
    InsufficientWork,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::FutureTimestamp => write!(f, "timestamp is in the future"),
            Rejection::BadLinkage => write!(f, "previous hash does not match chain head"),
            Rejection::BadPayloadHash => write!(f, "data hash does not match payload"),
            Rejection::BadDifficulty => write!(f, "unexpected bit shift"),
            Rejection::InsufficientWork => write!(f, "insufficient proof-of-work"),
        }
    }
}

/// Run the checks in order, stopping at the first failure. `now` is the
/// validation time in seconds since the epoch.
pub fn check_block(
    candidate: &Block,
    previous_hash: &Hash,
    bit_shift: u8,
    now: i64,
) -> Result<(), Rejection> {
    let header = candidate.get_header();

    if header.get_timestamp() > now {
        return Err(Rejection::FutureTimestamp);
    }

    if header.get_previous_hash() != previous_hash {
        return Err(Rejection::BadLinkage);
    }

    if header.get_data_hash() != &sha256_digest(candidate.get_payload()) {
        return Err(Rejection::BadPayloadHash);
    }

    if header.get_bit_shift() != bit_shift {
        return Err(Rejection::BadDifficulty);
    }

    if !meets_target(&header.hash(), &calculate_target(bit_shift)) {
        return Err(Rejection::InsufficientWork);
    }

    Ok(())
}

/// Accept or reject `candidate` as the successor of `previous_hash`.
pub fn validate(candidate: &Block, previous_hash: &Hash, bit_shift: u8) -> bool {
    let now = match current_timestamp() {
        Ok(now) => now,
        Err(e) => {
            warn!("Cannot validate block without a clock: {e}");
            return false;
        }
    };

    match check_block(candidate, previous_hash, bit_shift, now) {
        Ok(()) => true,
        Err(reason) => {
            debug!("Rejected block: {reason}");
            false
        }
    }
}
