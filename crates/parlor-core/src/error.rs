//! Error types for Parlor

use thiserror::Error;

/// Core error type for pool and session operations.
///
/// All payloads are plain strings so the enum stays `Clone + PartialEq`;
/// sessions accumulate errors in an ordered list and surface the first one
/// at finalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParlorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Finalization error: {0}")]
    Finalization(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, ParlorError>;
