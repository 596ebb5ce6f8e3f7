//! Test utilities for chain and node testing

use crate::core::{calculate_target, meets_target, Block, BlockHeader};
use crate::utils::{current_timestamp, sha256_digest, Hash};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Mine a block stamped with the current time
pub fn mine_test_block(previous_hash: Hash, payload: &[u8], bit_shift: u8) -> Block {
    let now = current_timestamp().expect("clock should be available in tests");
    mine_test_block_at(now, previous_hash, payload, bit_shift)
}

/// Mine a block with a fixed timestamp
pub fn mine_test_block_at(
    timestamp: i64,
    previous_hash: Hash,
    payload: &[u8],
    bit_shift: u8,
) -> Block {
    let target = calculate_target(bit_shift);
    let data_hash = sha256_digest(payload);
    let mut nonce = 0;
    loop {
        let header = BlockHeader::new(timestamp, previous_hash, data_hash, bit_shift, nonce);
        if meets_target(&header.hash(), &target) {
            return Block::from_parts(header, payload.to_vec()).expect("test payload fits");
        }
        nonce += 1;
    }
}

/// A writer that records everything sent to it, shareable with the test body
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A writer whose every write fails, standing in for a dead connection
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
