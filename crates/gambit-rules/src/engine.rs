//! The `RulesEngine` trait, the seam between rooms and game rules.

use gambit_protocol::{Fen, MoveOutcome, MoveRequest, Side};

use crate::RulesError;

/// A move ready to hand to an engine.
///
/// Built from a client's [`MoveRequest`] with the promotion default
/// applied. Engines only use `promotion` when the move actually promotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub from: String,
    pub to: String,
    pub promotion: char,
    pub flags: Option<String>,
}

impl Candidate {
    /// Fills in `default_promotion` when the request didn't name a piece.
    pub fn from_request(request: &MoveRequest, default_promotion: char) -> Self {
        Self {
            from: request.from.clone(),
            to: request.to.clone(),
            promotion: request.promotion.unwrap_or(default_promotion),
            flags: request.flags.clone(),
        }
    }
}

/// One game's rules and state, owned exclusively by a room.
///
/// `Send + 'static` because the room that owns it sits behind a lock that
/// any connection task may take.
pub trait RulesEngine: Send + 'static {
    /// A fresh game in its starting position.
    fn new_game() -> Self
    where
        Self: Sized;

    /// The side to move.
    fn turn(&self) -> Side;

    /// The canonical position.
    fn position(&self) -> Fen;

    /// Applies a candidate if it is legal for the side to move.
    ///
    /// On success the engine has advanced and the returned outcome
    /// describes the move. On failure the position is unchanged.
    fn apply_move(&mut self, candidate: &Candidate) -> Result<MoveOutcome, RulesError>;
}
