use crate::core::Block;
use crate::error::Result;
use crate::network::protocol::send_block;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one connection for the lifetime of the process
pub type PeerId = u64;

static NEXT_PEER_ID: AtomicU64 = AtomicU64::new(1);

/// Hand out a fresh peer id
pub fn next_peer_id() -> PeerId {
    NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Outbound half of a peer connection
pub struct Peer {
    id: PeerId,
    addr: String,
    writer: Box<dyn Write + Send>,
}

impl Peer {
    pub fn new(id: PeerId, addr: String, writer: Box<dyn Write + Send>) -> Peer {
        Peer { id, addr, writer }
    }

    pub fn get_id(&self) -> PeerId {
        self.id
    }

    pub fn get_addr(&self) -> &str {
        &self.addr
    }

    pub fn send_block(&mut self, block: &Block) -> Result<()> {
        send_block(&mut self.writer, block)
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .finish()
    }
}

/// Active peers. Owned by the node loop, which is the only writer; sessions
/// report membership changes as events instead of touching this directly.
#[derive(Default)]
pub struct PeerSet {
    inner: BTreeMap<PeerId, Peer>,
}

impl PeerSet {
    pub fn new() -> PeerSet {
        PeerSet {
            inner: BTreeMap::new(),
        }
    }

    pub fn add_peer(&mut self, peer: Peer) {
        self.inner.insert(peer.get_id(), peer);
    }

    pub fn evict_peer(&mut self, id: PeerId) -> Option<Peer> {
        self.inner.remove(&id)
    }

    pub fn get_mut(&mut self, id: PeerId) -> Option<&mut Peer> {
        self.inner.get_mut(&id)
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.inner.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Send `block` to every peer. A failed write is logged and skipped; the
    /// block is not retried for that peer. Returns how many writes succeeded.
    pub fn broadcast(&mut self, block: &Block) -> usize {
        self.send_to_all(block, None)
    }

    /// Relay `block` to every peer except the one it came from.
    pub fn broadcast_except(&mut self, block: &Block, origin: PeerId) -> usize {
        self.send_to_all(block, Some(origin))
    }

    fn send_to_all(&mut self, block: &Block, skip: Option<PeerId>) -> usize {
        let mut delivered = 0;
        for peer in self.inner.values_mut() {
            if Some(peer.id) == skip {
                continue;
            }
            match peer.send_block(block) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "Failed to send block to peer {} ({}): {e}",
                    peer.id, peer.addr
                ),
            }
        }
        delivered
    }
}
