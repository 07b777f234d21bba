//! Room configuration and the game-room state machine.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a [`RoomService`](crate::RoomService) owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum participants in one audio room. Joins beyond this are
    /// answered with `audio-room-full`.
    pub audio_capacity: usize,

    /// Promotion piece used when a move request doesn't name one.
    pub default_promotion: char,

    /// How long a room may sit empty before the reaper evicts it.
    ///
    /// `None` keeps empty rooms forever, so a stale room id always stays
    /// addressable.
    pub abandon_grace: Option<Duration>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            audio_capacity: 2,
            default_promotion: 'q',
            abandon_grace: None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// Where a game room is in its life, derived from its seats.
///
/// ```text
///                  both seated
/// WaitingForPlayers ─────────→ InProgress
///        ↑   │      ←─────────
///        │   │      one leaves
///  rejoin│   │last seat vacated
///        │   ↓
///    Abandoned { since }  ──(grace elapsed, reaper)──→ evicted
/// ```
///
/// The game itself survives every transition; a player who takes a vacated
/// seat continues from the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    WaitingForPlayers,
    InProgress,
    Abandoned { since: Instant },
}

impl RoomState {
    /// How long the room has been empty, or `None` if it isn't.
    pub fn abandoned_for(&self, now: Instant) -> Option<Duration> {
        match self {
            Self::Abandoned { since } => Some(now.saturating_duration_since(*since)),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Abandoned { .. } => write!(f, "Abandoned"),
        }
    }
}
