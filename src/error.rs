//! Error types for coordinator-client.
//!
//! Failures are split along two axes that callers must be able to tell apart:
//!
//! - **Transport**: the request could not be delivered or no complete reply
//!   arrived. See [`TransportError`].
//! - **Application**: the coordinator answered with a non-OK [`Status`].
//!
//! Everything else (truncated responses, undecodable payloads, bad
//! configuration) gets its own variant.

use thiserror::Error;

use crate::protocol::{Opcode, Status};

/// Failures raised by a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not establish a connection to the service locator.
    #[error("couldn't connect to {locator}: {message}")]
    Connect { locator: String, message: String },

    /// I/O error on an established connection.
    #[error("I/O error: {0}")]
    Io(String),

    /// No complete response arrived in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,

    /// The peer violated the framing protocol.
    #[error("framing error: {0}")]
    Protocol(String),

    /// The session was used out of order (receive without send).
    #[error("session misuse: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe => TransportError::Closed,
            _ => TransportError::Io(err.to_string()),
        }
    }
}

impl TransportError {
    /// Whether the failure may clear on a later attempt.
    ///
    /// Session misuse never does.
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportError::Unsupported(_))
    }
}

/// Main error type for all coordinator RPCs.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-axis failure. Retried only by server enlistment.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response was too short for its header or answered the wrong RPC.
    #[error("malformed {opcode} response: {reason}")]
    MalformedResponse { opcode: Opcode, reason: String },

    /// The coordinator rejected the request.
    #[error("{0}")]
    Status(Status),

    /// A structured payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A structured payload could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Bad session configuration or service locator.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for transport-axis failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// The application status carried by this error, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_are_distinguishable() {
        let transport = Error::from(TransportError::Closed);
        assert!(transport.is_transport());
        assert_eq!(transport.status(), None);

        let status = Error::Status(Status::TableDoesntExist);
        assert!(!status.is_transport());
        assert_eq!(status.status(), Some(Status::TableDoesntExist));
    }

    #[test]
    fn test_io_error_mapping() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(TransportError::from(eof), TransportError::Closed);

        let other = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(matches!(TransportError::from(other), TransportError::Io(m) if m.contains("boom")));
    }

    #[test]
    fn test_misuse_is_not_transient() {
        assert!(TransportError::Closed.is_transient());
        assert!(TransportError::Timeout(std::time::Duration::from_secs(1)).is_transient());
        assert!(!TransportError::Unsupported("receive before send".to_string()).is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::MalformedResponse {
            opcode: Opcode::OpenTable,
            reason: "2 bytes".to_string(),
        };
        assert!(err.to_string().contains("OPEN_TABLE"));

        let err = Error::from(TransportError::Timeout(std::time::Duration::from_millis(5)));
        assert!(err.to_string().starts_with("transport error: timed out"));
    }
}
