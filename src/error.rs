//! Error types for eslink
//!
//! Provides a unified error type for all operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using EslError
pub type Result<T> = std::result::Result<T, EslError>;

/// Unified error type for eslink operations
#[derive(Debug, Error)]
pub enum EslError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("bad address {addr:?}: {reason}")]
    BadAddress { addr: String, reason: String },

    /// The peer disconnected or the client was closed.
    #[error("connection closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    #[error("malformed content-length: {0:?}")]
    MalformedContentLength(String),

    #[error("body too large: {size} bytes (max {max})")]
    BodyTooLarge { size: usize, max: usize },

    #[error("unexpected end of stream: expected {expected} bytes, got {actual}")]
    UnexpectedEof { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Authentication Errors
    // -------------------------------------------------------------------------
    #[error("missing auth request")]
    MissingAuthRequest,

    #[error("access denied")]
    AccessDenied,

    #[error("invalid password")]
    InvalidPassword,

    #[error("unexpected content type: {0}")]
    UnexpectedContentType(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// The switch answered with an `-ERR` reply.
    #[error("{0}")]
    CommandFailed(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl EslError {
    /// True when the error means the connection is gone for good
    pub fn is_closed(&self) -> bool {
        matches!(self, EslError::Closed)
    }
}
