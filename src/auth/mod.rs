mod error;
mod http;
mod memory;

pub use error::AuthError;
pub use http::HttpIdentityProvider;
pub use memory::MemoryIdentityProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::UserEmail;

/// Authenticated identity context issued by the provider after a successful
/// login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_email: UserEmail,
    pub id_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Change-notification stream for the current session. Dropping the receiver
/// is the unsubscribe.
pub type SessionEvents = watch::Receiver<Option<Session>>;

/// Identity boundary. Credential storage and verification stay on the
/// provider's side of this trait.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    fn session(&self) -> Option<Session>;
    fn on_session_change(&self) -> SessionEvents;
}
