// This is the in-memory chain the node loop owns
// Blocks are only ever appended, and every block must point at the hash of the one before it
// There is no fork tracking: a block that does not extend the head is simply not accepted

use crate::core::Block;
use crate::error::{NodeError, Result};
use crate::utils::{hash_to_hex, Hash};

// The first block links to the all-zero hash
pub const EMPTY_CHAIN_HEAD: Hash = [0u8; 32];

pub struct Chain {
    blocks: Vec<Block>, // Accepted blocks, oldest first
    head_hash: Hash,    // Hash of the newest block header (or EMPTY_CHAIN_HEAD)
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    pub fn new() -> Chain {
        Chain {
            blocks: Vec::new(),
            head_hash: EMPTY_CHAIN_HEAD,
        }
    }

    // I refuse anything that does not link to my current head
    pub fn append(&mut self, block: Block) -> Result<()> {
        if block.get_header().get_previous_hash() != &self.head_hash {
            return Err(NodeError::InvalidBlock(format!(
                "block links to {} but head is {}",
                hash_to_hex(block.get_header().get_previous_hash()),
                hash_to_hex(&self.head_hash)
            )));
        }
        self.head_hash = block.hash();
        self.blocks.push(block);
        Ok(())
    }

    pub fn get_head_hash(&self) -> &Hash {
        &self.head_hash
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    // Chain sync replays blocks in this order
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}
