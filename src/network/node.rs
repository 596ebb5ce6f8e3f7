//! The node loop
//!
//! A single thread owns the chain, the miner and the peer set. Sessions and the
//! accept loop talk to it over one FIFO channel. Every iteration drains that
//! channel into local queues, then does exactly one unit of work in fixed
//! priority order:
//!
//! 1. answer one chain-sync request by replaying the whole chain,
//! 2. otherwise validate one received block and relay it if accepted,
//! 3. otherwise try one nonce.
//!
//! Nothing in an iteration blocks, so mining always makes progress between
//! network events.

use crate::config::Config;
use crate::core::{validate, Block, Chain, ProofOfWork};
use crate::error::Result;
use crate::network::peers::{Peer, PeerId, PeerSet};
use crate::utils::{hash_to_hex, Hash};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

/// Messages delivered to the node loop
#[derive(Debug)]
pub enum NodeEvent {
    /// A connection was accepted or dialed
    PeerJoined(Peer),
    /// A session ended
    PeerLeft(PeerId),
    /// A peer sent a decoded block
    Block { from: PeerId, block: Block },
    /// A peer asked for the whole chain
    ChainSyncRequest(PeerId),
}

/// What one iteration of the loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    ServedChainSync { peer: PeerId, sent: usize },
    AcceptedBlock {
        from: PeerId,
        hash: Hash,
        relayed: usize,
    },
    RejectedBlock { from: PeerId },
    Mined { hash: Hash, delivered: usize },
    Searching,
}

pub struct Node {
    bit_shift: u8,
    chain: Chain,
    miner: ProofOfWork,
    peers: PeerSet,
    events: Receiver<NodeEvent>,
    pending_syncs: VecDeque<PeerId>,
    pending_blocks: VecDeque<(PeerId, Block)>,
    last_accepted: Instant,
}

impl Node {
    /// Create a node with an empty chain, plus the sender sessions use to reach it.
    pub fn new(bit_shift: u8, payload: Vec<u8>) -> Result<(Node, Sender<NodeEvent>)> {
        let chain = Chain::new();
        let miner = ProofOfWork::new(*chain.get_head_hash(), payload, bit_shift)?;
        let (tx, rx) = mpsc::channel();

        let node = Node {
            bit_shift,
            chain,
            miner,
            peers: PeerSet::new(),
            events: rx,
            pending_syncs: VecDeque::new(),
            pending_blocks: VecDeque::new(),
            last_accepted: Instant::now(),
        };
        Ok((node, tx))
    }

    pub fn from_config(config: &Config) -> Result<(Node, Sender<NodeEvent>)> {
        Node::new(config.get_bit_shift(), config.get_payload().to_vec())
    }

    /// Iterate until `shutdown` is set. The flag is checked between
    /// iterations only.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(
            "Node loop started (bit shift {}, chain length {})",
            self.bit_shift,
            self.chain.len()
        );
        while !shutdown.load(Ordering::Relaxed) {
            self.step();
        }
        info!("Node loop stopped at chain length {}", self.chain.len());
    }

    /// One iteration: drain pending events, then do the highest-priority work.
    pub fn step(&mut self) -> StepOutcome {
        self.drain_events();

        if let Some(peer) = self.pending_syncs.pop_front() {
            return self.serve_chain_sync(peer);
        }

        if let Some((from, block)) = self.pending_blocks.pop_front() {
            return self.handle_block(from, block);
        }

        self.mine_step()
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                NodeEvent::PeerJoined(peer) => {
                    info!("Peer {} connected: {}", peer.get_id(), peer.get_addr());
                    self.peers.add_peer(peer);
                }
                NodeEvent::PeerLeft(id) => {
                    if let Some(peer) = self.peers.evict_peer(id) {
                        info!("Peer {} disconnected: {}", id, peer.get_addr());
                    }
                }
                NodeEvent::Block { from, block } => self.pending_blocks.push_back((from, block)),
                NodeEvent::ChainSyncRequest(id) => self.pending_syncs.push_back(id),
            }
        }
    }

    fn serve_chain_sync(&mut self, id: PeerId) -> StepOutcome {
        let mut sent = 0;
        match self.peers.get_mut(id) {
            Some(peer) => {
                for block in self.chain.iter() {
                    if let Err(e) = peer.send_block(block) {
                        warn!("Chain sync to peer {id} ({}) failed: {e}", peer.get_addr());
                        break;
                    }
                    sent += 1;
                }
                debug!("Sent {sent} blocks to peer {id} for chain sync");
            }
            None => debug!("Chain sync requested by unknown peer {id}"),
        }
        StepOutcome::ServedChainSync { peer: id, sent }
    }

    fn handle_block(&mut self, from: PeerId, block: Block) -> StepOutcome {
        if !validate(&block, self.chain.get_head_hash(), self.bit_shift) {
            return StepOutcome::RejectedBlock { from };
        }

        let Some(hash) = self.accept(block, "Received") else {
            return StepOutcome::RejectedBlock { from };
        };
        // The sender already has it.
        let relayed = match self.chain.last() {
            Some(received) => self.peers.broadcast_except(received, from),
            None => 0,
        };
        StepOutcome::AcceptedBlock {
            from,
            hash,
            relayed,
        }
    }

    fn mine_step(&mut self) -> StepOutcome {
        let block = match self.miner.step() {
            Ok(Some(block)) => block,
            Ok(None) => return StepOutcome::Searching,
            Err(e) => {
                error!("Mining step failed: {e}");
                return StepOutcome::Searching;
            }
        };

        let Some(hash) = self.accept(block, "Mined") else {
            return StepOutcome::Searching;
        };
        let delivered = match self.chain.last() {
            Some(mined) => self.peers.broadcast(mined),
            None => 0,
        };
        StepOutcome::Mined { hash, delivered }
    }

    // Append, move the head and restart the nonce search from zero.
    fn accept(&mut self, block: Block, origin: &str) -> Option<Hash> {
        let hash = block.hash();
        if let Err(e) = self.chain.append(block) {
            error!("{origin} block could not be appended: {e}");
            return None;
        }
        self.miner.reset(hash);

        let elapsed = self.last_accepted.elapsed();
        self.last_accepted = Instant::now();
        info!(
            "{origin} block {} at height {} after {:.3}s",
            hash_to_hex(&hash),
            self.chain.len(),
            elapsed.as_secs_f64()
        );
        Some(hash)
    }

    pub fn get_chain(&self) -> &Chain {
        &self.chain
    }

    pub fn get_peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn get_nonce(&self) -> u64 {
        self.miner.get_nonce()
    }

    pub fn get_bit_shift(&self) -> u8 {
        self.bit_shift
    }
}
