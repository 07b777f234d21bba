//! Named events: one JSON object per frame.
//!
//! Both directions use the same adjacently tagged shape,
//!
//! ```text
//! { "event": "join-room", "data": "R1" }
//! { "event": "both-joined" }
//! ```
//!
//! so a browser client can dispatch on `event` exactly like it would with
//! a socket.io style emitter. Event names are kept verbatim, including the
//! two camelCase ones (`playerName`, `OpponentName`) clients already use.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Fen, MoveOutcome, MoveRequest, RoomKey, Side};

/// Client → server events.
///
/// Audio signaling payloads are [`Value`]s: the server never looks inside
/// a session description or ICE candidate, it only forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Join (creating if needed) the game room with this id.
    #[serde(rename = "join-room")]
    JoinRoom(RoomKey),

    /// Announce a display name to the room.
    #[serde(rename = "playerName", rename_all = "camelCase")]
    PlayerName { room_id: RoomKey, name: String },

    /// Submit a move in a game room.
    #[serde(rename = "move", rename_all = "camelCase")]
    Move {
        room_id: RoomKey,
        #[serde(rename = "move")]
        request: MoveRequest,
    },

    /// Chat text for everyone else in the room.
    #[serde(rename = "send-message", rename_all = "camelCase")]
    SendMessage { room_id: RoomKey, message: String },

    /// Join (creating if needed) the audio room with this id.
    #[serde(rename = "audio-join")]
    AudioJoin(RoomKey),

    #[serde(rename = "audio-offer", rename_all = "camelCase")]
    AudioOffer { room_id: RoomKey, offer: Value },

    #[serde(rename = "audio-answer", rename_all = "camelCase")]
    AudioAnswer { room_id: RoomKey, answer: Value },

    #[serde(rename = "audio-ice", rename_all = "camelCase")]
    AudioIce { room_id: RoomKey, candidate: Value },

    /// Ask the server for a fresh, currently unused room code.
    #[serde(rename = "new-room")]
    NewRoom,
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Both seats of the requested game room are taken.
    #[serde(rename = "room-full")]
    RoomFull,

    /// The seat the requester was given.
    #[serde(rename = "player-color")]
    PlayerColor(Side),

    /// The canonical position. Clients replace their board with it.
    #[serde(rename = "board-state")]
    BoardState(Fen),

    /// Both seats are occupied; the game can start.
    #[serde(rename = "both-joined")]
    BothJoined,

    #[serde(rename = "OpponentName")]
    OpponentName { name: String },

    /// A move the other player made.
    #[serde(rename = "opponent-move")]
    OpponentMove(MoveOutcome),

    #[serde(rename = "receive-message")]
    ReceiveMessage(String),

    /// The other seat's occupant disconnected.
    #[serde(rename = "opponent-left")]
    OpponentLeft,

    #[serde(rename = "audio-room-created")]
    AudioRoomCreated,

    #[serde(rename = "audio-room-joined")]
    AudioRoomJoined,

    /// The audio room already has its two participants.
    #[serde(rename = "audio-room-full")]
    AudioRoomFull,

    #[serde(rename = "audio-peer-joined")]
    AudioPeerJoined,

    #[serde(rename = "audio-peer-left")]
    AudioPeerLeft,

    #[serde(rename = "audio-offer")]
    AudioOffer(Value),

    #[serde(rename = "audio-answer")]
    AudioAnswer(Value),

    #[serde(rename = "audio-ice")]
    AudioIce(Value),

    /// Reply to [`ClientEvent::NewRoom`].
    #[serde(rename = "room-code")]
    RoomCode(RoomKey),
}
