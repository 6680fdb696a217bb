//! Error types for the custody ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Registration with a colliding identifier
    #[error("Product already exists: {0}")]
    AlreadyExists(String),

    /// Unknown product identifier
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Product status does not satisfy the operation's precondition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller role does not match the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
