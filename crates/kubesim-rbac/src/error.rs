//! Error types for parsing RBAC names.

use thiserror::Error;

pub type RbacResult<T> = Result<T, RbacError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RbacError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    #[error("unknown station: {0}")]
    UnknownStation(String),
}
