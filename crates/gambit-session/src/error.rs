//! Error types for the session layer.

use gambit_transport::ConnectionId;

/// Errors from registering and removing connections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The transport handed out an id that is still registered.
    /// Ids are never reused, so this points at a double registration.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),

    /// No outbound channel exists for the connection.
    #[error("connection {0} is not registered")]
    NotFound(ConnectionId),
}
