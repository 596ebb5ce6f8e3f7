//! Peer-to-peer networking
//!
//! This module handles the wire protocol, per-connection sessions, the peer
//! set and the node loop that arbitrates between network events and mining.

pub mod node;
pub mod peers;
pub mod protocol;
pub mod server;
pub mod session;

pub use node::{Node, NodeEvent, StepOutcome};
pub use peers::{next_peer_id, Peer, PeerId, PeerSet};
pub use protocol::{
    read_message, send_block, send_chain_sync_request, Message, MSG_BLOCK, MSG_CHAIN_SYNC,
};
pub use server::{Server, ShutdownHandle};
pub use session::PeerSession;
