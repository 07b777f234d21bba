//! Error types for the room layer.

use gambit_protocol::{RoomKey, Side};
use gambit_rules::RulesError;
use gambit_session::SessionError;
use gambit_transport::ConnectionId;

/// Why a room operation did nothing.
///
/// Most of these are silent on the wire: the client is assumed to be stale
/// rather than hostile, so the handler logs them and moves on. `RoomFull`
/// and `AudioRoomFull` are the exceptions; the room has already told the
/// requester by the time the error comes back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room with that key exists.
    #[error("room {0} not found")]
    NotFound(RoomKey),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomKey),

    /// The audio room is at capacity.
    #[error("audio room {0} is full")]
    AudioRoomFull(RoomKey),

    /// The connection holds no seat in this game room.
    #[error("{conn} holds no seat in room {room}")]
    NotSeated { conn: ConnectionId, room: RoomKey },

    /// The connection hasn't joined this room.
    #[error("{conn} is not a member of room {room}")]
    NotMember { conn: ConnectionId, room: RoomKey },

    /// A seated player moved while it was the other side's turn.
    #[error("not your turn in room {room}, {expected} to move")]
    NotYourTurn { room: RoomKey, expected: Side },

    /// The rules engine refused the move.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Registering or removing the connection's channel failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
