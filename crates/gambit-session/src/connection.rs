//! The per-connection context: identity plus room memberships.

use std::collections::BTreeSet;
use std::fmt;

use gambit_protocol::RoomKey;
use gambit_transport::ConnectionId;

// ---------------------------------------------------------------------------
// RoomKind / Membership
// ---------------------------------------------------------------------------

/// Which registry a membership points into.
///
/// Game rooms and audio rooms are tracked separately but share one key
/// space, so a client can hold `(Game, "R1")` and `(Audio, "R1")` at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoomKind {
    Game,
    Audio,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game => write!(f, "game"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// One room a connection has joined.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Membership {
    pub kind: RoomKind,
    pub room: RoomKey,
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A live client, as the room layer sees it.
///
/// Owned by the connection's handler task and passed by `&mut` into every
/// room operation, which records memberships as joins succeed. Teardown
/// consumes it, so the disconnect path runs at most once per connection and
/// always sees the final membership set.
///
/// Deliberately not `Clone`.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    memberships: BTreeSet<Membership>,
}

impl Connection {
    /// A fresh connection that has joined nothing.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            memberships: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Records a membership. Returns `false` if it was already recorded.
    pub fn join(&mut self, kind: RoomKind, room: RoomKey) -> bool {
        self.memberships.insert(Membership { kind, room })
    }

    pub fn is_member(&self, kind: RoomKind, room: &RoomKey) -> bool {
        self.memberships.iter().any(|m| m.kind == kind && &m.room == room)
    }

    /// Memberships in a stable order: game rooms first, then by key.
    pub fn memberships(&self) -> impl Iterator<Item = &Membership> {
        self.memberships.iter()
    }

    /// Ends the connection, handing back everything it had joined.
    pub fn into_memberships(self) -> Vec<Membership> {
        self.memberships.into_iter().collect()
    }
}
