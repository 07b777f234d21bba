//! Connection context for Gambit.
//!
//! This crate answers two questions every other layer asks:
//!
//! 1. **Who is this, and where are they?** ([`Connection`]): the
//!    transport-assigned identity plus every room it has joined, tagged by
//!    [`RoomKind`] because a game room and an audio room may share a key.
//! 2. **How do I reach them?** ([`PeerDirectory`]): one outbound channel
//!    per live connection, addressed through a [`Recipient`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← records memberships, fans events out through the directory
//!     ↕
//! Session Layer (this crate)  ← identity, memberships, outbound channels
//!     ↕
//! Protocol + Transport (below)  ← ServerEvent, RoomKey, ConnectionId
//! ```

mod connection;
mod directory;
mod error;

pub use connection::{Connection, Membership, RoomKind};
pub use directory::{Outbound, PeerDirectory, Recipient};
pub use error::SessionError;
