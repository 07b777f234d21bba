//! Transport abstraction layer for Gambit.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the persistent bidirectional channel a player talks to the server on.
//! Everything above this crate sees a connection as "something with an
//! opaque [`ConnectionId`] that sends and receives frames".
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketHandshake, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Valid for the lifetime of one transport session and never reused while
/// the process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// What `accept` hands back before the protocol handshake has run.
    type Handshake: Handshake<Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next socket-level connection.
    ///
    /// Returns as soon as the socket is accepted. The peer hasn't said
    /// anything yet, so the caller finishes the handshake in the
    /// connection's own task where a silent peer only stalls itself.
    async fn accept(&mut self) -> Result<Self::Handshake, Self::Error>;
}

/// An accepted socket whose protocol handshake is still pending.
pub trait Handshake: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// Identifier the finished connection will carry.
    fn id(&self) -> ConnectionId;

    /// Runs the handshake to completion.
    ///
    /// Waits on the peer without a deadline; callers wrap it in a timeout.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving must not block each other: a handler waits on
/// [`recv`](Connection::recv) while room broadcasts for the same player
/// are pushed out through [`send`](Connection::send).
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
