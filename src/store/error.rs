use thiserror::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no record with id {0}")]
    NotFound(String),

    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store unreachable: {0}")]
    Transport(String),
}
