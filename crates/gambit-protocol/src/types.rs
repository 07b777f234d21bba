//! Domain values carried inside events.
//!
//! These are small, owned, serializable types. The room layer keys its
//! registries by [`RoomKey`], seats are labelled by [`Side`], and the
//! canonical board is always shipped as a [`Fen`] string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// RoomKey
// ---------------------------------------------------------------------------

/// A normalized room identifier.
///
/// Room ids come straight from clients (they are typed in or shared as a
/// link), so the key trims surrounding whitespace and upper-cases the rest:
/// `" r1 "` and `"R1"` name the same room. Blank ids are refused.
///
/// On the wire a key is a plain JSON string; invalid strings fail
/// deserialization, which drops the whole event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomKey(String);

impl RoomKey {
    /// Normalizes a raw client-supplied room id.
    ///
    /// # Errors
    /// Returns [`ProtocolError::BlankRoomId`] if nothing is left after
    /// trimming.
    pub fn new(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::BlankRoomId);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the normalized id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomKey {
    type Error = ProtocolError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<RoomKey> for String {
    fn from(key: RoomKey) -> Self {
        key.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two seats in a game room, and the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Seats in assignment order: the first joiner of an empty room is
    /// always white.
    pub const SEATING_ORDER: [Side; 2] = [Side::White, Side::Black];

    /// Returns the other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("white"),
            Self::Black => f.write_str("black"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fen
// ---------------------------------------------------------------------------

/// A canonical position string (Forsyth–Edwards Notation).
///
/// Opaque to everything except the rules engine; the server only stores
/// and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fen(String);

impl Fen {
    /// The standard chess starting position.
    pub const STARTING: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Wraps an already formatted position string.
    pub fn new(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    /// Returns the position string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// A move as submitted by a client: `{from, to, promotion?, flags?}`.
///
/// Squares stay as strings here; only the rules engine knows how to parse
/// them. `flags` is whatever the client's local engine produced and is
/// carried along untouched. An empty or `null` promotion counts as none, so
/// the room's default piece applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    #[serde(
        default,
        deserialize_with = "promotion_letter",
        skip_serializing_if = "Option::is_none"
    )]
    pub promotion: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

fn promotion_letter<'de, D>(deserializer: D) -> Result<Option<char>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let mut letters = raw.trim().chars();
    match (letters.next(), letters.next()) {
        (None, _) => Ok(None),
        (Some(letter), None) => Ok(Some(letter)),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a single promotion letter",
        )),
    }
}

/// The result of an accepted move, relayed to the opponent.
///
/// Mirrors the move object chess clients already understand: algebraic
/// notation, the piece that moved, what it captured, the special-move
/// flags (`n` normal, `b` double pawn push, `e` en passant, `c` capture,
/// `p` promotion, `k`/`q` castling), plus the positions on either side of
/// the move and whose turn it is now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub color: Side,
    pub from: String,
    pub to: String,
    pub piece: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    pub flags: String,
    pub san: String,
    pub lan: String,
    pub before: Fen,
    pub after: Fen,
    pub turn: Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_key_trims_and_uppercases() {
        let key = RoomKey::new("  4f9p12 ").unwrap();
        assert_eq!(key.as_str(), "4F9P12");
        assert_eq!(key, RoomKey::new("4F9P12").unwrap());
    }

    #[test]
    fn test_room_key_rejects_blank() {
        assert!(matches!(RoomKey::new("   "), Err(ProtocolError::BlankRoomId)));
        assert!(matches!(RoomKey::new(""), Err(ProtocolError::BlankRoomId)));
    }

    #[test]
    fn test_room_key_deserialize_normalizes() {
        let key: RoomKey = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(key.to_string(), "ABC");
    }

    #[test]
    fn test_room_key_deserialize_blank_fails() {
        let result: Result<RoomKey, _> = serde_json::from_str(r#""  ""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::White).unwrap(), r#""white""#);
        assert_eq!(serde_json::to_string(&Side::Black).unwrap(), r#""black""#);
    }

    #[test]
    fn test_side_opposite_and_order() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::Black.opposite(), Side::White);
        assert_eq!(Side::SEATING_ORDER[0], Side::White);
    }

    #[test]
    fn test_fen_is_plain_string_on_wire() {
        let fen = Fen::new(Fen::STARTING);
        let json = serde_json::to_string(&fen).unwrap();
        assert_eq!(json, format!("\"{}\"", Fen::STARTING));
    }

    #[test]
    fn test_move_request_optional_fields_default() {
        let req: MoveRequest =
            serde_json::from_str(r#"{"from":"e2","to":"e4"}"#).unwrap();
        assert_eq!(req.from, "e2");
        assert_eq!(req.to, "e4");
        assert_eq!(req.promotion, None);
        assert_eq!(req.flags, None);
    }

    #[test]
    fn test_move_request_promotion_is_single_letter() {
        let req: MoveRequest = serde_json::from_str(
            r#"{"from":"e7","to":"e8","promotion":"n","flags":"np"}"#,
        )
        .unwrap();
        assert_eq!(req.promotion, Some('n'));
        assert_eq!(req.flags.as_deref(), Some("np"));
    }

    #[test]
    fn test_move_request_blank_promotion_means_none() {
        for raw in [r#""""#, r#"" ""#, "null"] {
            let json = format!(r#"{{"from":"e7","to":"e8","promotion":{raw}}}"#);
            let req: MoveRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(req.promotion, None, "promotion {raw}");
        }
    }

    #[test]
    fn test_move_request_rejects_multi_letter_promotion() {
        let result = serde_json::from_str::<MoveRequest>(
            r#"{"from":"e7","to":"e8","promotion":"queen"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_move_outcome_json_shape() {
        let outcome = MoveOutcome {
            color: Side::White,
            from: "e2".into(),
            to: "e4".into(),
            piece: 'p',
            captured: None,
            promotion: None,
            flags: "b".into(),
            san: "e4".into(),
            lan: "e2e4".into(),
            before: Fen::new(Fen::STARTING),
            after: Fen::new("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
            turn: Side::Black,
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["color"], "white");
        assert_eq!(json["piece"], "p");
        assert_eq!(json["san"], "e4");
        assert_eq!(json["turn"], "black");
        // Absent capture/promotion are omitted, not null.
        assert!(json.get("captured").is_none());
        assert!(json.get("promotion").is_none());
    }
}
