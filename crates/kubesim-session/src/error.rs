//! Error types for scaler sessions.

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("scaler session is closed")]
    Closed,
}
