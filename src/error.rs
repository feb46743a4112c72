//! Error types for framekv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FramekvError
pub type Result<T> = std::result::Result<T, FramekvError>;

/// Unified error type for framekv operations
#[derive(Debug, Error)]
pub enum FramekvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("connection error: {0}")]
    Connection(String),

    #[error("partial write: sent {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("storage error: {0}")]
    Storage(String),

    #[error("key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Remote Errors (error response received from the server)
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Remote(String),
}
