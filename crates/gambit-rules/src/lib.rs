//! Rules engines for Gambit.
//!
//! The room layer never decides whether a move is legal. It asks a
//! [`RulesEngine`]: "here is a candidate, give me the resulting position or
//! reject it". The room still decides *whose* turn it is from network
//! identity, because an engine has no idea which connection is which.
//!
//! # Key types
//!
//! - [`RulesEngine`]: the capability trait a room owns one instance of
//! - [`Candidate`]: a move request with defaults filled in
//! - [`ChessEngine`]: standard chess, backed by the `chess` crate
//! - [`RulesError`]: why a candidate was rejected

mod engine;
mod error;
mod standard;

pub use engine::{Candidate, RulesEngine};
pub use error::RulesError;
pub use standard::ChessEngine;
