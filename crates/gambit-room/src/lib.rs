//! Room lifecycle, move relay and signaling relay for Gambit.
//!
//! A [`RoomService`] owns two registries keyed by [`RoomKey`]: game rooms
//! (two seats plus a rules engine) and audio rooms (a capped participant
//! list). Every room has its own lock, held for the full
//! check-mutate-notify sequence of one operation, so rooms run fully in
//! parallel while each one sees its events one at a time.
//!
//! # Key types
//!
//! - [`RoomService`]: joins, moves, chat, signaling, disconnect, reaping
//! - [`GameRoom`] / [`Seating`]: seat assignment and turn authority
//! - [`AudioRoom`] / [`AudioJoin`]: audio participant list
//! - [`RoomConfig`] / [`RoomState`]: settings and game-room lifecycle
//! - [`RoomError`]: why an operation did nothing
//!
//! [`RoomKey`]: gambit_protocol::RoomKey

mod audio;
mod config;
mod disconnect;
mod error;
mod game;
mod lifecycle;
mod registry;
mod relay;
mod service;

pub use audio::{AudioJoin, AudioRoom};
pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use game::{GameRoom, Seating};
pub use relay::Signal;
pub use service::{GameSnapshot, RoomService};
