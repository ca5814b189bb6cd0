//! Error types for respwire
//!
//! Provides a unified error type for encoding, decoding and session I/O.
//! Server-side error replies (`-ERR ...`) are not errors here: they decode
//! to [`Reply::Error`](crate::protocol::Reply::Error) like any other reply.

use thiserror::Error;

/// Result type alias using RespError
pub type Result<T> = std::result::Result<T, RespError>;

/// Unified error type for respwire operations
#[derive(Debug, Error)]
pub enum RespError {
    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    /// Malformed command template or argument list. Raised before any I/O.
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Could not connect to {addr} after {attempts} attempts: {source}")]
    Connect {
        addr: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The session hit a fatal error earlier and can no longer be used
    #[error("Connection is broken by an earlier I/O or protocol error")]
    ConnectionBroken,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Protocol error: got 0x{0:02x} as reply type byte")]
    UnknownReplyType(u8),

    #[error("Protocol error: {0}")]
    LimitExceeded(String),

    // -------------------------------------------------------------------------
    // Resource Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RespError {
    /// True for every error caused by bytes the server sent
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            RespError::Protocol(_) | RespError::UnknownReplyType(_) | RespError::LimitExceeded(_)
        )
    }

    /// True when the stream position is unknown after this error.
    ///
    /// A session that returns a fatal error must not be reused.
    pub fn is_fatal(&self) -> bool {
        self.is_protocol()
            || matches!(
                self,
                RespError::Io(_) | RespError::OutOfMemory(_) | RespError::ConnectionBroken
            )
    }
}
