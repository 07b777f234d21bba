//! Standard chess, backed by the `chess` crate.
//!
//! The `chess` crate does move generation and legality. This module adds
//! what a relay needs on top: the move clocks (the crate's boards don't
//! carry them), the chess.js style flags and standard algebraic notation
//! that clients display.

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};
use gambit_protocol::{Fen, MoveOutcome, Side};

use crate::{Candidate, RulesEngine, RulesError};

/// A standard chess game.
#[derive(Debug, Clone)]
pub struct ChessEngine {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl ChessEngine {
    /// Starts from an arbitrary position instead of the initial one.
    ///
    /// # Errors
    /// Returns [`RulesError::InvalidPosition`] for malformed FEN or an
    /// impossible position.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let board = Board::from_str(fen)
            .map_err(|_| RulesError::InvalidPosition(fen.to_string()))?;
        let mut clocks = fen.split_whitespace().skip(4);
        let halfmove_clock = clocks.next().and_then(|c| c.parse().ok()).unwrap_or(0);
        let fullmove_number = clocks.next().and_then(|c| c.parse().ok()).unwrap_or(1);
        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl RulesEngine for ChessEngine {
    fn new_game() -> Self {
        Self {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn turn(&self) -> Side {
        side_of(self.board.side_to_move())
    }

    fn position(&self) -> Fen {
        // The crate prints placement, side, castling and en passant; the
        // clocks it prints are placeholders, so ours replace them.
        let board = self.board.to_string();
        let fields: Vec<&str> = board.split_whitespace().take(4).collect();
        Fen::new(format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        ))
    }

    fn apply_move(&mut self, candidate: &Candidate) -> Result<MoveOutcome, RulesError> {
        let from = parse_square(&candidate.from)?;
        let to = parse_square(&candidate.to)?;
        let illegal = || RulesError::IllegalMove {
            from: candidate.from.clone(),
            to: candidate.to.clone(),
        };

        let piece = self.board.piece_on(from).ok_or_else(illegal)?;
        let promotion = if piece == Piece::Pawn && is_back_rank(to) {
            Some(promotion_piece(candidate.promotion)?)
        } else {
            None
        };

        let mv = ChessMove::new(from, to, promotion);
        if !MoveGen::new_legal(&self.board).any(|legal| legal == mv) {
            return Err(illegal());
        }

        let color = self.board.side_to_move();
        let before = self.position();
        let en_passant = piece == Piece::Pawn
            && from.get_file() != to.get_file()
            && self.board.piece_on(to).is_none();
        let captured = if en_passant {
            Some(Piece::Pawn)
        } else {
            self.board.piece_on(to)
        };
        let kind = MoveKind::classify(piece, from, to, captured.is_some(), en_passant);
        let mut san = algebraic(&self.board, mv, piece, kind);

        self.board = self.board.make_move_new(mv);

        if piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if color == Color::Black {
            self.fullmove_number += 1;
        }

        if self.board.status() == BoardStatus::Checkmate {
            san.push('#');
        } else if *self.board.checkers() != chess::EMPTY {
            san.push('+');
        }

        let mut lan = format!("{from}{to}");
        if let Some(p) = promotion {
            lan.push(piece_letter(p));
        }

        Ok(MoveOutcome {
            color: side_of(color),
            from: from.to_string(),
            to: to.to_string(),
            piece: piece_letter(piece),
            captured: captured.map(piece_letter),
            promotion: promotion.map(piece_letter),
            flags: kind.flags(promotion.is_some()),
            san,
            lan,
            before,
            after: self.position(),
            turn: self.turn(),
        })
    }
}

/// The shape of a move, as far as notation and flags care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    Quiet,
    DoublePush,
    Capture,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

impl MoveKind {
    fn classify(
        piece: Piece,
        from: Square,
        to: Square,
        capture: bool,
        en_passant: bool,
    ) -> Self {
        let file_delta = to.get_file().to_index() as i32 - from.get_file().to_index() as i32;
        let rank_delta = to.get_rank().to_index() as i32 - from.get_rank().to_index() as i32;
        match piece {
            Piece::King if file_delta == 2 => Self::CastleKingside,
            Piece::King if file_delta == -2 => Self::CastleQueenside,
            _ if en_passant => Self::EnPassant,
            _ if capture => Self::Capture,
            Piece::Pawn if rank_delta.abs() == 2 => Self::DoublePush,
            _ => Self::Quiet,
        }
    }

    /// chess.js flag letters, in chess.js order.
    fn flags(self, promotes: bool) -> String {
        let mut flags = String::from(match self {
            Self::Quiet => "n",
            Self::Capture => "c",
            Self::DoublePush => "b",
            Self::EnPassant => "e",
            Self::CastleKingside => "k",
            Self::CastleQueenside => "q",
        });
        if promotes {
            flags.push('p');
        }
        flags
    }
}

/// Standard algebraic notation, without the check suffix.
fn algebraic(board: &Board, mv: ChessMove, piece: Piece, kind: MoveKind) -> String {
    match kind {
        MoveKind::CastleKingside => return "O-O".to_string(),
        MoveKind::CastleQueenside => return "O-O-O".to_string(),
        _ => {}
    }

    let from = mv.get_source().to_string();
    let capture = matches!(kind, MoveKind::Capture | MoveKind::EnPassant);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if capture {
            san.push_str(&from[..1]);
        }
    } else {
        san.push(piece_letter(piece).to_ascii_uppercase());
        san.push_str(&disambiguation(board, mv, piece));
    }
    if capture {
        san.push('x');
    }
    san.push_str(&mv.get_dest().to_string());
    if let Some(p) = mv.get_promotion() {
        san.push('=');
        san.push(piece_letter(p).to_ascii_uppercase());
    }
    san
}

/// File, rank or full square of the origin when another piece of the
/// same kind could also reach the destination.
fn disambiguation(board: &Board, mv: ChessMove, piece: Piece) -> String {
    let from = mv.get_source();
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|other| {
            other.get_dest() == mv.get_dest()
                && other.get_source() != from
                && board.piece_on(other.get_source()) == Some(piece)
        })
        .map(|other| other.get_source())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let name = from.to_string();
    let shares_file = rivals.iter().any(|sq| sq.get_file() == from.get_file());
    let shares_rank = rivals.iter().any(|sq| sq.get_rank() == from.get_rank());
    if !shares_file {
        name[..1].to_string()
    } else if !shares_rank {
        name[1..].to_string()
    } else {
        name
    }
}

fn parse_square(name: &str) -> Result<Square, RulesError> {
    let normalized = name.trim().to_ascii_lowercase();
    if normalized.len() != 2 {
        return Err(RulesError::InvalidSquare(name.to_string()));
    }
    Square::from_str(&normalized).map_err(|_| RulesError::InvalidSquare(name.to_string()))
}

fn is_back_rank(square: Square) -> bool {
    matches!(square.get_rank().to_index(), 0 | 7)
}

fn promotion_piece(letter: char) -> Result<Piece, RulesError> {
    match letter.to_ascii_lowercase() {
        'n' => Ok(Piece::Knight),
        'b' => Ok(Piece::Bishop),
        'r' => Ok(Piece::Rook),
        'q' => Ok(Piece::Queen),
        _ => Err(RulesError::InvalidPromotion(letter)),
    }
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(from: &str, to: &str) -> Candidate {
        Candidate {
            from: from.into(),
            to: to.into(),
            promotion: 'q',
            flags: None,
        }
    }

    /// Plays a sequence of `"e2e4"`-style moves, panicking on any rejection.
    fn play(engine: &mut ChessEngine, moves: &[&str]) -> Vec<MoveOutcome> {
        moves
            .iter()
            .map(|m| {
                engine
                    .apply_move(&candidate(&m[..2], &m[2..4]))
                    .unwrap_or_else(|e| panic!("{m} rejected: {e}"))
            })
            .collect()
    }

    #[test]
    fn test_new_game_is_starting_position_white_to_move() {
        let engine = ChessEngine::new_game();
        assert_eq!(engine.position().as_str(), Fen::STARTING);
        assert_eq!(engine.turn(), Side::White);
        assert_eq!(engine.board.status(), BoardStatus::Ongoing);
    }

    #[test]
    fn test_double_pawn_push() {
        let mut engine = ChessEngine::new_game();
        let outcome = engine.apply_move(&candidate("e2", "e4")).unwrap();

        assert_eq!(outcome.color, Side::White);
        assert_eq!(outcome.piece, 'p');
        assert_eq!(outcome.san, "e4");
        assert_eq!(outcome.lan, "e2e4");
        assert_eq!(outcome.flags, "b");
        assert_eq!(outcome.captured, None);
        assert_eq!(outcome.before.as_str(), Fen::STARTING);
        assert_eq!(
            outcome.after.as_str(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(outcome.turn, Side::Black);
        assert_eq!(engine.position(), outcome.after);
    }

    #[test]
    fn test_illegal_move_leaves_position_unchanged() {
        let mut engine = ChessEngine::new_game();
        let result = engine.apply_move(&candidate("e2", "e5"));
        assert!(matches!(result, Err(RulesError::IllegalMove { .. })));
        assert_eq!(engine.position().as_str(), Fen::STARTING);
    }

    #[test]
    fn test_moving_opponents_piece_is_illegal() {
        // The engine enforces side-to-move for pieces; black's pawn can't
        // move while white is to play.
        let mut engine = ChessEngine::new_game();
        let result = engine.apply_move(&candidate("e7", "e5"));
        assert!(matches!(result, Err(RulesError::IllegalMove { .. })));
    }

    #[test]
    fn test_empty_origin_is_illegal() {
        let mut engine = ChessEngine::new_game();
        let result = engine.apply_move(&candidate("e4", "e5"));
        assert!(matches!(result, Err(RulesError::IllegalMove { .. })));
    }

    #[test]
    fn test_invalid_square_is_rejected() {
        let mut engine = ChessEngine::new_game();
        assert!(matches!(
            engine.apply_move(&candidate("z9", "e4")),
            Err(RulesError::InvalidSquare(_))
        ));
        assert!(matches!(
            engine.apply_move(&candidate("e2", "e44")),
            Err(RulesError::InvalidSquare(_))
        ));
    }

    #[test]
    fn test_uppercase_squares_are_accepted() {
        let mut engine = ChessEngine::new_game();
        let outcome = engine.apply_move(&candidate("G1", "F3")).unwrap();
        assert_eq!(outcome.san, "Nf3");
    }

    #[test]
    fn test_knight_move_advances_halfmove_clock() {
        let mut engine = ChessEngine::new_game();
        let outcome = engine.apply_move(&candidate("g1", "f3")).unwrap();
        assert_eq!(outcome.flags, "n");
        assert!(outcome.after.as_str().ends_with(" b KQkq - 1 1"));
    }

    #[test]
    fn test_fullmove_number_increments_after_black() {
        let mut engine = ChessEngine::new_game();
        play(&mut engine, &["g1f3", "g8f6"]);
        assert!(engine.position().as_str().ends_with(" w KQkq - 2 2"));
    }

    #[test]
    fn test_pawn_capture() {
        let mut engine = ChessEngine::new_game();
        let outcomes = play(&mut engine, &["e2e4", "d7d5", "e4d5"]);
        let capture = &outcomes[2];
        assert_eq!(capture.san, "exd5");
        assert_eq!(capture.flags, "c");
        assert_eq!(capture.captured, Some('p'));
    }

    #[test]
    fn test_en_passant() {
        let mut engine = ChessEngine::new_game();
        let outcomes = play(&mut engine, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        let ep = &outcomes[4];
        assert_eq!(ep.flags, "e");
        assert_eq!(ep.captured, Some('p'));
        assert_eq!(ep.san, "exd6");
    }

    #[test]
    fn test_kingside_castle() {
        let mut engine = ChessEngine::new_game();
        let outcomes = play(
            &mut engine,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5", "e1g1"],
        );
        let castle = &outcomes[6];
        assert_eq!(castle.san, "O-O");
        assert_eq!(castle.flags, "k");
        assert_eq!(castle.piece, 'k');
    }

    #[test]
    fn test_checkmate_suffix() {
        // Fool's mate.
        let mut engine = ChessEngine::new_game();
        let outcomes = play(&mut engine, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(outcomes[3].san, "Qh4#");
        assert_eq!(engine.board.status(), BoardStatus::Checkmate);
    }

    #[test]
    fn test_check_suffix() {
        let mut engine = ChessEngine::new_game();
        let outcomes = play(&mut engine, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(outcomes[2].san, "Qh5+");
    }

    #[test]
    fn test_promotion_defaults_to_candidate_piece() {
        let mut engine = ChessEngine::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let outcome = engine.apply_move(&candidate("e7", "e8")).unwrap();
        assert_eq!(outcome.san, "e8=Q");
        assert_eq!(outcome.promotion, Some('q'));
        assert_eq!(outcome.flags, "np");
        assert_eq!(outcome.lan, "e7e8q");
    }

    #[test]
    fn test_underpromotion() {
        let mut engine = ChessEngine::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let outcome = engine
            .apply_move(&Candidate {
                promotion: 'n',
                ..candidate("e7", "e8")
            })
            .unwrap();
        assert_eq!(outcome.san, "e8=N");
    }

    #[test]
    fn test_bad_promotion_letter_is_rejected() {
        let mut engine = ChessEngine::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let result = engine.apply_move(&Candidate {
            promotion: 'k',
            ..candidate("e7", "e8")
        });
        assert_eq!(result.unwrap_err(), RulesError::InvalidPromotion('k'));
    }

    #[test]
    fn test_promotion_letter_ignored_for_ordinary_moves() {
        let mut engine = ChessEngine::new_game();
        let outcome = engine
            .apply_move(&Candidate {
                promotion: 'x',
                ..candidate("e2", "e4")
            })
            .unwrap();
        assert_eq!(outcome.promotion, None);
    }

    #[test]
    fn test_knight_disambiguation_by_file() {
        let mut engine = ChessEngine::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        let outcome = engine.apply_move(&candidate("b1", "d2")).unwrap();
        assert_eq!(outcome.san, "Nbd2");
    }

    #[test]
    fn test_from_fen_keeps_clocks() {
        let engine =
            ChessEngine::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 7 31").unwrap();
        assert!(engine.position().as_str().ends_with(" 7 31"));
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(matches!(
            ChessEngine::from_fen("not a position"),
            Err(RulesError::InvalidPosition(_))
        ));
    }
}
