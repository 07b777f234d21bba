//! Error types for the rules layer.

/// Why a rules engine refused a candidate move.
///
/// The relay drops rejected moves without telling the sender, so these
/// only ever reach the debug log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A square name that isn't on the board (`"z9"`, `""`).
    #[error("invalid square {0:?}")]
    InvalidSquare(String),

    /// A promotion letter other than `n`, `b`, `r` or `q`.
    #[error("invalid promotion piece {0:?}")]
    InvalidPromotion(char),

    /// Well-formed, but not legal in the current position.
    #[error("illegal move {from}{to}")]
    IllegalMove { from: String, to: String },

    /// A FEN string the engine couldn't set up.
    #[error("invalid position {0:?}")]
    InvalidPosition(String),
}
