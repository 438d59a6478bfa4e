use thiserror::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed email: {0}")]
    MalformedEmail(String),

    #[error("email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("session expired")]
    SessionExpired,

    #[error("identity provider unreachable: {0}")]
    Transport(String),
}
