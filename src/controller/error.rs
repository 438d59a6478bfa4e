use thiserror::Error;

// Wiring-level errors for the dashboard and account flows
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("auth error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    #[error("no authenticated session")]
    NotSignedIn,
}
