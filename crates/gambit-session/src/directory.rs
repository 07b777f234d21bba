//! Outbound channels, one per live connection.
//!
//! Room code never touches a socket. It pushes [`ServerEvent`]s into the
//! directory, and each connection's handler task drains its own channel
//! onto the wire. Unbounded channels keep the push side synchronous, so a
//! room can fan out while it still holds its lock and the per-recipient
//! order matches the order the room emitted.

use std::collections::HashMap;

use gambit_protocol::ServerEvent;
use gambit_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::SessionError;

/// The receiving end a handler drains onto its connection.
pub type Outbound = mpsc::UnboundedReceiver<ServerEvent>;

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who, among a room's members, should get an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member.
    All,
    /// Every member except one (usually the sender).
    AllExcept(ConnectionId),
}

impl Recipient {
    pub fn includes(&self, id: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::AllExcept(excluded) => *excluded != id,
        }
    }
}

// ---------------------------------------------------------------------------
// PeerDirectory
// ---------------------------------------------------------------------------

/// Maps each live connection to its outbound channel.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a channel for a new connection and returns its receiving end.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyRegistered`] if the id is taken.
    pub fn register(&mut self, id: ConnectionId) -> Result<Outbound, SessionError> {
        if self.peers.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.peers.insert(id, tx);
        tracing::debug!(%id, "peer registered");
        Ok(rx)
    }

    /// Drops a connection's channel. Events already queued stay readable
    /// from the receiver until it is dropped.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the id isn't registered.
    pub fn unregister(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        self.peers
            .remove(&id)
            .map(|_| tracing::debug!(%id, "peer unregistered"))
            .ok_or(SessionError::NotFound(id))
    }

    /// Queues an event for one connection. Returns whether it was queued.
    ///
    /// An unknown id or a receiver that has gone away isn't an error here:
    /// the connection is mid-teardown and its disconnect is already on the
    /// way.
    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let Some(tx) = self.peers.get(&id) else {
            tracing::debug!(%id, "dropping event for unknown peer");
            return false;
        };
        if tx.send(event).is_err() {
            tracing::debug!(%id, "dropping event for closed peer");
            return false;
        }
        true
    }

    /// Queues an event for every member selected by `recipient`, in member
    /// order. Returns how many were queued.
    pub fn dispatch<I>(&self, members: I, recipient: Recipient, event: &ServerEvent) -> usize
    where
        I: IntoIterator<Item = ConnectionId>,
    {
        members
            .into_iter()
            .filter(|id| recipient.includes(*id))
            .filter(|id| self.send_to(*id, event.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
