use crate::core::difficulty::{calculate_target, meets_target};
use crate::core::{Block, BlockHeader, MAX_PAYLOAD_LEN};
use crate::error::{NodeError, Result};
use crate::utils::{current_timestamp, sha256_digest, Hash};
use num_bigint::BigUint;

/// Incremental nonce search on top of the current chain head.
///
/// Each call to [`ProofOfWork::step`] builds one candidate header, stamped
/// with the current time, and tests it against the target. The node loop
/// calls it once per iteration so mining never blocks network events.
pub struct ProofOfWork {
    previous_hash: Hash,
    payload: Vec<u8>,
    data_hash: Hash,
    bit_shift: u8,
    target: BigUint,
    nonce: u64,
}

impl ProofOfWork {
    pub fn new(previous_hash: Hash, payload: Vec<u8>, bit_shift: u8) -> Result<ProofOfWork> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(NodeError::PayloadTooLarge { len: payload.len() });
        }
        Ok(ProofOfWork {
            previous_hash,
            data_hash: sha256_digest(&payload),
            payload,
            bit_shift,
            target: calculate_target(bit_shift),
            nonce: 0,
        })
    }

    /// Try the current nonce. Returns the block if its hash beats the target,
    /// otherwise advances the nonce and returns `None`.
    pub fn step(&mut self) -> Result<Option<Block>> {
        let header = BlockHeader::new(
            current_timestamp()?,
            self.previous_hash,
            self.data_hash,
            self.bit_shift,
            self.nonce,
        );

        if meets_target(&header.hash(), &self.target) {
            return Block::from_parts(header, self.payload.clone()).map(Some);
        }

        self.nonce = self.nonce.wrapping_add(1);
        Ok(None)
    }

    /// Search until a block is found.
    pub fn run(&mut self) -> Result<Block> {
        loop {
            if let Some(block) = self.step()? {
                return Ok(block);
            }
        }
    }

    /// Restart the search on top of a new head.
    pub fn reset(&mut self, previous_hash: Hash) {
        self.previous_hash = previous_hash;
        self.nonce = 0;
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn get_bit_shift(&self) -> u8 {
        self.bit_shift
    }
}
