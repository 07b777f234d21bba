//! A game room: two seats and the engine they play on.

use std::time::Instant;

use gambit_protocol::{Fen, MoveOutcome, RoomKey, Side};
use gambit_rules::{Candidate, RulesEngine};
use gambit_transport::ConnectionId;

use crate::{RoomError, RoomState};

/// The result of a successful [`GameRoom::take_seat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seating {
    /// The connection was given this seat just now.
    Seated(Side),
    /// The connection already held this seat.
    AlreadySeated(Side),
}

impl Seating {
    pub fn side(self) -> Side {
        match self {
            Self::Seated(side) | Self::AlreadySeated(side) => side,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Self::Seated(_))
    }
}

/// Seats plus the one engine instance the room owns.
///
/// Seat identity is the only authority the room adds on top of the
/// engine: the engine says whose turn it is, the room says which
/// connection that is.
#[derive(Debug)]
pub struct GameRoom<E> {
    key: RoomKey,
    seats: [Option<ConnectionId>; 2],
    engine: E,
    state: RoomState,
}

fn slot(side: Side) -> usize {
    match side {
        Side::White => 0,
        Side::Black => 1,
    }
}

impl<E: RulesEngine> GameRoom<E> {
    /// An empty room with a fresh game.
    pub fn new(key: RoomKey) -> Self {
        Self {
            key,
            seats: [None, None],
            engine: E::new_game(),
            state: RoomState::WaitingForPlayers,
        }
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn occupant(&self, side: Side) -> Option<ConnectionId> {
        self.seats[slot(side)]
    }

    pub fn seat_of(&self, id: ConnectionId) -> Option<Side> {
        Side::SEATING_ORDER
            .into_iter()
            .find(|side| self.occupant(*side) == Some(id))
    }

    /// Seated connections, white first.
    pub fn occupants(&self) -> Vec<ConnectionId> {
        Side::SEATING_ORDER
            .into_iter()
            .filter_map(|side| self.occupant(side))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    pub fn position(&self) -> Fen {
        self.engine.position()
    }

    pub fn turn(&self) -> Side {
        self.engine.turn()
    }

    /// Gives `id` the first free seat, white before black.
    ///
    /// # Errors
    /// Returns [`RoomError::RoomFull`] if both seats belong to others.
    pub fn take_seat(&mut self, id: ConnectionId) -> Result<Seating, RoomError> {
        if let Some(side) = self.seat_of(id) {
            return Ok(Seating::AlreadySeated(side));
        }
        let side = Side::SEATING_ORDER
            .into_iter()
            .find(|side| self.occupant(*side).is_none())
            .ok_or_else(|| RoomError::RoomFull(self.key.clone()))?;
        self.seats[slot(side)] = Some(id);
        self.settle(Instant::now());
        Ok(Seating::Seated(side))
    }

    /// Clears whichever seat `id` holds. Returns that seat, if any.
    pub fn vacate(&mut self, id: ConnectionId, now: Instant) -> Option<Side> {
        let side = self.seat_of(id)?;
        self.seats[slot(side)] = None;
        self.settle(now);
        Some(side)
    }

    /// Plays a move for `id`.
    ///
    /// # Errors
    /// - [`RoomError::NotSeated`] if `id` holds no seat
    /// - [`RoomError::NotYourTurn`] if its seat isn't the engine's turn
    /// - [`RoomError::Rules`] if the engine rejects the move
    ///
    /// On any error the position is unchanged.
    pub fn play(
        &mut self,
        id: ConnectionId,
        candidate: &Candidate,
    ) -> Result<MoveOutcome, RoomError> {
        let side = self.seat_of(id).ok_or_else(|| RoomError::NotSeated {
            conn: id,
            room: self.key.clone(),
        })?;
        let expected = self.engine.turn();
        if side != expected {
            return Err(RoomError::NotYourTurn {
                room: self.key.clone(),
                expected,
            });
        }
        Ok(self.engine.apply_move(candidate)?)
    }

    fn settle(&mut self, now: Instant) {
        self.state = match (self.occupants().len(), self.state) {
            (2, _) => RoomState::InProgress,
            (0, RoomState::Abandoned { since }) => RoomState::Abandoned { since },
            (0, _) => RoomState::Abandoned { since: now },
            _ => RoomState::WaitingForPlayers,
        };
    }
}

#[cfg(test)]
mod tests {
    use gambit_rules::{ChessEngine, RulesError};

    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn room() -> GameRoom<ChessEngine> {
        GameRoom::new(RoomKey::new("g1").unwrap())
    }

    fn candidate(from: &str, to: &str) -> Candidate {
        Candidate {
            from: from.into(),
            to: to.into(),
            promotion: 'q',
            flags: None,
        }
    }

    // =====================================================================
    // take_seat() / vacate()
    // =====================================================================

    #[test]
    fn test_take_seat_white_then_black_then_full() {
        let mut room = room();
        assert_eq!(room.take_seat(cid(1)).unwrap(), Seating::Seated(Side::White));
        assert_eq!(room.state(), RoomState::WaitingForPlayers);
        assert_eq!(room.take_seat(cid(2)).unwrap(), Seating::Seated(Side::Black));
        assert_eq!(room.state(), RoomState::InProgress);
        assert!(matches!(room.take_seat(cid(3)), Err(RoomError::RoomFull(_))));
        assert_eq!(room.occupants(), vec![cid(1), cid(2)]);
    }

    #[test]
    fn test_take_seat_again_is_idempotent() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        room.take_seat(cid(2)).unwrap();
        assert_eq!(
            room.take_seat(cid(2)).unwrap(),
            Seating::AlreadySeated(Side::Black)
        );
    }

    #[test]
    fn test_vacated_seat_is_reassigned() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        room.take_seat(cid(2)).unwrap();

        assert_eq!(room.vacate(cid(1), Instant::now()), Some(Side::White));
        assert_eq!(room.occupant(Side::White), None);
        assert_eq!(room.occupant(Side::Black), Some(cid(2)));
        assert_eq!(room.state(), RoomState::WaitingForPlayers);

        assert_eq!(room.take_seat(cid(3)).unwrap(), Seating::Seated(Side::White));
    }

    #[test]
    fn test_vacate_unseated_returns_none() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        assert_eq!(room.vacate(cid(9), Instant::now()), None);
        assert_eq!(room.occupants(), vec![cid(1)]);
    }

    #[test]
    fn test_last_vacate_abandons_and_keeps_since() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        let left_at = Instant::now();
        room.vacate(cid(1), left_at);
        assert_eq!(room.state(), RoomState::Abandoned { since: left_at });

        room.take_seat(cid(2)).unwrap();
        assert_eq!(room.state(), RoomState::WaitingForPlayers);
    }

    // =====================================================================
    // play()
    // =====================================================================

    #[test]
    fn test_play_by_seated_player_on_turn() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        room.take_seat(cid(2)).unwrap();

        let outcome = room.play(cid(1), &candidate("e2", "e4")).unwrap();
        assert_eq!(outcome.san, "e4");
        assert_eq!(room.turn(), Side::Black);
    }

    #[test]
    fn test_play_out_of_turn_is_rejected() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        room.take_seat(cid(2)).unwrap();
        let before = room.position();

        let err = room.play(cid(2), &candidate("e7", "e5")).unwrap_err();
        assert!(matches!(err, RoomError::NotYourTurn { expected: Side::White, .. }));
        assert_eq!(room.position(), before);
    }

    #[test]
    fn test_play_by_unseated_is_rejected() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        let err = room.play(cid(7), &candidate("e2", "e4")).unwrap_err();
        assert!(matches!(err, RoomError::NotSeated { .. }));
    }

    #[test]
    fn test_play_illegal_move_surfaces_rules_error() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        let err = room.play(cid(1), &candidate("e2", "e5")).unwrap_err();
        assert!(matches!(err, RoomError::Rules(RulesError::IllegalMove { .. })));
        assert_eq!(room.position().as_str(), Fen::STARTING);
    }

    #[test]
    fn test_game_survives_vacated_seat() {
        let mut room = room();
        room.take_seat(cid(1)).unwrap();
        room.take_seat(cid(2)).unwrap();
        room.play(cid(1), &candidate("e2", "e4")).unwrap();
        room.vacate(cid(1), Instant::now());
        room.take_seat(cid(3)).unwrap();

        assert_eq!(room.turn(), Side::Black);
        assert_ne!(room.position().as_str(), Fen::STARTING);
    }
}
