//! Unified error type for the Gambit server.

use gambit_protocol::ProtocolError;
use gambit_room::RoomError;
use gambit_session::SessionError;
use gambit_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` conversions let `?` lift layer errors straight into this
/// type inside the server and handler.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// Accepting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An event couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Registering a connection's channel failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
