use crate::config::Config;
use crate::error::{NodeError, Result};
use crate::network::node::{Node, NodeEvent};
use crate::network::peers::{next_peer_id, Peer, PeerId};
use crate::network::protocol::send_chain_sync_request;
use crate::network::session::PeerSession;
use log::{error, info, warn};
use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

// Sockets of live sessions, so shutdown can close them.
type SessionStreams = Arc<RwLock<HashMap<PeerId, TcpStream>>>;

/// Listener plus the threads around the node loop: one accept loop, one
/// session thread per connection and the node loop itself.
pub struct Server {
    config: Config,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    sessions: SessionStreams,
}

/// Stops a running [`Server`]. The node loop stops between iterations; the
/// accept loop is woken with a throwaway local connection. Sessions still open
/// at that point are shut down before `run` returns.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
        let _ = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Server {
    /// Bind the listen address. Failure here is fatal for the node.
    pub fn bind(config: Config) -> Result<Server> {
        let addr = config.get_listen_addr();
        let listener = TcpListener::bind(&addr)
            .map_err(|e| NodeError::Network(format!("Failed to bind to {addr}: {e}")))?;

        Ok(Server {
            config,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut wake_addr = self.local_addr()?;
        if wake_addr.ip().is_unspecified() {
            wake_addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into());
        }
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr,
        })
    }

    /// Start the node loop, dial the seed peer if one is configured, then
    /// accept connections until shut down.
    pub fn run(self) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);

        let (mut node, events) = Node::from_config(&self.config)?;
        let node_shutdown = Arc::clone(&self.shutdown);
        let node_thread = thread::Builder::new()
            .name("node-loop".to_string())
            .spawn(move || node.run(&node_shutdown))?;

        if let Some(seed) = self.config.get_seed_peer() {
            if let Err(e) = self.connect_to_seed(seed, &events) {
                error!("Failed to connect to seed peer {seed}: {e}");
            }
        }

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.start_session(stream, &events) {
                        warn!("Failed to register incoming connection: {e}");
                    }
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        node_thread
            .join()
            .map_err(|_| NodeError::Network("Node loop panicked".to_string()))?;
        self.close_sessions()?;
        info!("Server stopped");
        Ok(())
    }

    // Dial the seed, ask for its chain, then treat it like any other peer.
    fn connect_to_seed(&self, seed: &str, events: &Sender<NodeEvent>) -> Result<()> {
        let addr = seed
            .to_socket_addrs()
            .map_err(|e| NodeError::Network(format!("Invalid address {seed}: {e}")))?
            .next()
            .ok_or_else(|| NodeError::Network(format!("No address found for {seed}")))?;

        let mut stream = TcpStream::connect_timeout(&addr, self.config.get_write_timeout())
            .map_err(|e| NodeError::Network(format!("Failed to connect to {addr}: {e}")))?;
        send_chain_sync_request(&mut stream)?;

        let id = self.start_session(stream, events)?;
        info!("Dialed seed peer {seed} as peer {id}");
        Ok(())
    }

    fn start_session(&self, stream: TcpStream, events: &Sender<NodeEvent>) -> Result<PeerId> {
        let addr = stream.peer_addr()?.to_string();
        stream.set_write_timeout(Some(self.config.get_write_timeout()))?;
        let writer = stream.try_clone()?;

        let id = next_peer_id();
        self.sessions
            .write()
            .map_err(|e| NodeError::Network(format!("Failed to acquire session lock: {e}")))?
            .insert(id, stream.try_clone()?);

        events
            .send(NodeEvent::PeerJoined(Peer::new(id, addr.clone(), Box::new(writer))))
            .map_err(|_| NodeError::Network("Node loop is not running".to_string()))?;

        let session_events = events.clone();
        let sessions = Arc::clone(&self.sessions);
        thread::Builder::new()
            .name(format!("peer-{id}"))
            .spawn(move || {
                PeerSession::new(id, addr, &stream, session_events).run();
                let _ = stream.shutdown(Shutdown::Both);
                if let Ok(mut sessions) = sessions.write() {
                    sessions.remove(&id);
                }
            })?;

        Ok(id)
    }

    // Each session thread sees the read fail and exits on its own.
    fn close_sessions(&self) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| NodeError::Network(format!("Failed to acquire session lock: {e}")))?;
        for (id, stream) in sessions.drain() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                warn!("Failed to close session for peer {id}: {e}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn test_config() -> Config {
        let mut config = Config::new(0);
        config.set_bit_shift(255);
        config
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = Server::bind(test_config()).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn test_bind_conflict_is_error() {
        let first = Server::bind(test_config()).unwrap();
        let port = first.local_addr().unwrap().port();

        let result = Server::bind(Config::new(port));
        assert!(matches!(result, Err(NodeError::Network(_))));
    }

    #[test]
    fn test_shutdown_closes_open_sessions() {
        let server = Server::bind(test_config()).unwrap();
        let addr = server.local_addr().unwrap();
        let handle = server.shutdown_handle().unwrap();
        let runner = thread::spawn(move || server.run());

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        // Give the accept loop time to start a session for the client.
        thread::sleep(Duration::from_millis(200));

        handle.shutdown();
        assert!(runner.join().unwrap().is_ok());

        let mut rest = Vec::new();
        assert_eq!(client.read_to_end(&mut rest).unwrap(), 0);
    }

    #[test]
    fn test_shutdown_stops_run() {
        let server = Server::bind(test_config()).unwrap();
        let handle = server.shutdown_handle().unwrap();
        let runner = thread::spawn(move || server.run());

        handle.shutdown();
        assert!(handle.is_shutdown());
        assert!(runner.join().unwrap().is_ok());
    }
}
