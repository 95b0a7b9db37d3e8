//! Error types for connection management.

use thiserror::Error;

/// Errors that can occur while managing a connection.
#[derive(Error, Debug)]
pub enum SocketError {
    /// Base URL scheme is not one of `http`, `https`, `ws`, `wss`.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No connection has ever been established.
    #[error("Not connected: call connect() first")]
    NotConnected,

    /// The connection was manually closed and automatic recovery is
    /// suppressed until the next `connect()`.
    #[error("Connection was manually closed")]
    ManuallyClosed,

    /// Transport-level failure reported by a transport implementation.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for connection-management operations.
pub type Result<T> = std::result::Result<T, SocketError>;

impl SocketError {
    /// Create a new invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl(url.into())
    }

    /// Create a new transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SocketError::invalid_url("ftp://example.com");
        assert_eq!(format!("{err}"), "Invalid URL: ftp://example.com");

        let err = SocketError::ManuallyClosed;
        assert_eq!(format!("{err}"), "Connection was manually closed");
    }

    #[test]
    fn test_transport_helper() {
        let err = SocketError::transport("handshake refused");
        assert!(matches!(err, SocketError::Transport(_)));
        assert_eq!(format!("{err}"), "Transport error: handshake refused");
    }
}
