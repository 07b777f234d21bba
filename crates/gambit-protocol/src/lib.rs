//! Wire protocol for Gambit.
//!
//! This crate defines the "language" that clients and servers speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): the named messages
//!   that travel on the wire, one per frame.
//! - **Domain values** ([`RoomKey`], [`Side`], [`Fen`], [`MoveRequest`],
//!   [`MoveOutcome`]): the payloads those events carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the room
//! service (who gets what). It doesn't know about connections or rooms;
//! it only knows how messages look.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Rooms → Protocol (ServerEvent) → Transport
//! ```

mod codec;
mod error;
mod event;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use event::{ClientEvent, ServerEvent};
pub use types::{Fen, MoveOutcome, MoveRequest, RoomKey, Side};
