//! Crate-wide error type.

/// Errors raised by stores and CLI commands.
///
/// The repository never propagates these to its callers: persistence
/// failures are logged and the in-memory collection stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for task manager operations.
pub type Result<T> = std::result::Result<T, Error>;
