//! Transport abstraction
//!
//! Replication only needs to push and poll action messages, know which end
//! is the host, and notice when the room loses its other occupant.
//! `LoopbackChannel` pairs two peers in-process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use super::protocol::ActionMessage;

/// Two-party relay channel
pub trait ActionChannel {
    /// Fire-and-forget delivery to the other peer
    fn send(&mut self, msg: ActionMessage);
    /// Next received message, if any. Never blocks.
    fn try_recv(&mut self) -> Option<ActionMessage>;
    fn is_host(&self) -> bool;
    /// False once the room no longer has both occupants
    fn peer_connected(&self) -> bool;
}

/// Shared connection flag for a loopback pair
#[derive(Debug, Clone)]
pub struct Connection(Arc<AtomicBool>);

impl Connection {
    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Drop the link for both ends
    pub fn disconnect(&self) {
        if self.0.swap(false, Ordering::AcqRel) {
            log::info!("Loopback link closed");
        }
    }
}

/// In-process channel half
pub struct LoopbackChannel {
    tx: Sender<ActionMessage>,
    rx: Receiver<ActionMessage>,
    is_host: bool,
    connection: Connection,
}

impl LoopbackChannel {
    /// Connected `(host, client)` pair
    pub fn pair() -> (Self, Self) {
        let (host_tx, client_rx) = mpsc::channel();
        let (client_tx, host_rx) = mpsc::channel();
        let connection = Connection(Arc::new(AtomicBool::new(true)));
        let host = Self {
            tx: host_tx,
            rx: host_rx,
            is_host: true,
            connection: connection.clone(),
        };
        let client = Self {
            tx: client_tx,
            rx: client_rx,
            is_host: false,
            connection,
        };
        (host, client)
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }
}

impl ActionChannel for LoopbackChannel {
    fn send(&mut self, msg: ActionMessage) {
        if !self.connection.is_connected() {
            log::debug!("Dropping `{}` on closed link", msg.action);
            return;
        }
        if let Err(e) = self.tx.send(msg) {
            log::debug!("Peer half gone, dropping `{}`", e.0.action);
        }
    }

    fn try_recv(&mut self) -> Option<ActionMessage> {
        self.rx.try_recv().ok()
    }

    fn is_host(&self) -> bool {
        self.is_host
    }

    fn peer_connected(&self) -> bool {
        self.connection.is_connected()
    }
}
