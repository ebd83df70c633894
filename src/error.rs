//! Error types for pciesim
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for simulator driver operations
#[derive(Debug, Error)]
pub enum SimError {
    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// A pipe endpoint could not be opened; fatal to the session
    #[error("Failed to open {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Send failed: {0}")]
    Send(#[source] std::io::Error),

    #[error("Read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The command stream was closed by `disconnect`
    #[error("Transport closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Timeout waiting for response with tag {tag} after {waited:?}")]
    Timeout { tag: u8, waited: Duration },

    /// The tag counter wrapped onto a command that was still waiting
    #[error("Tag {tag} was reused by a newer command after {waited:?}")]
    TagReused { tag: u8, waited: Duration },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
