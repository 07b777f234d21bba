//! # Gambit
//!
//! Real-time coordinator for two-player chess sessions.
//!
//! Clients connect over WebSocket and speak named JSON events. Gambit
//! seats them in game rooms, enforces turn order while a rules engine
//! judges legality, relays chat, and relays WebRTC audio negotiation
//! between the two players without looking inside it. When a connection
//! drops, every room it joined is cleaned up and the others are told.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit::prelude::*;
//!
//! # async fn start() -> Result<(), GambitError> {
//! let config = ServerConfig::from_env()?;
//! GambitServerBuilder::from_config(config)
//!     .build::<ChessEngine>()
//!     .await?
//!     .run()
//!     .await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, DEFAULT_PORT, ServerConfig};
pub use error::GambitError;
pub use server::{GambitServer, GambitServerBuilder};

pub mod prelude {
    pub use crate::{ConfigError, GambitError, GambitServer, GambitServerBuilder, ServerConfig};
    pub use gambit_protocol::{
        ClientEvent, Codec, Fen, JsonCodec, MoveOutcome, MoveRequest, RoomKey, ServerEvent, Side,
    };
    pub use gambit_room::{RoomConfig, RoomError, RoomService};
    pub use gambit_rules::{ChessEngine, RulesEngine};
}
