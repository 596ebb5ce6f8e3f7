use crate::network::node::NodeEvent;
use crate::network::peers::PeerId;
use crate::network::protocol::{read_message, Message};
use log::{debug, info};
use std::io::Read;
use std::sync::mpsc::Sender;

/// Per-connection read loop.
///
/// Frames inbound messages and forwards them to the node loop. The first read
/// error (an orderly close included) ends the session: it reports the peer as
/// gone and returns, and the caller closes the socket. There is no retry.
pub struct PeerSession<R> {
    id: PeerId,
    addr: String,
    reader: R,
    events: Sender<NodeEvent>,
}

impl<R: Read> PeerSession<R> {
    pub fn new(id: PeerId, addr: String, reader: R, events: Sender<NodeEvent>) -> Self {
        Self {
            id,
            addr,
            reader,
            events,
        }
    }

    pub fn run(mut self) {
        loop {
            let event = match read_message(&mut self.reader) {
                Ok(Some(Message::Block(block))) => NodeEvent::Block {
                    from: self.id,
                    block,
                },
                Ok(Some(Message::ChainSyncRequest)) => NodeEvent::ChainSyncRequest(self.id),
                Ok(None) => {
                    debug!("Ignoring unknown message tag from {}", self.addr);
                    continue;
                }
                Err(e) => {
                    info!("Peer {} ({}) disconnected: {e}", self.id, self.addr);
                    break;
                }
            };

            if self.events.send(event).is_err() {
                // Node loop is gone; nothing left to forward to.
                break;
            }
        }

        let _ = self.events.send(NodeEvent::PeerLeft(self.id));
    }
}
