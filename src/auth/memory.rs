use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use super::{AuthError, IdentityProvider, Session, SessionEvents};
use crate::model::UserEmail;

/// In-process identity provider holding a credential map and publishing
/// session changes over a watch channel. Registration signs the new account
/// in, matching the managed provider's behavior.
pub struct MemoryIdentityProvider {
    credentials: Mutex<HashMap<String, String>>,
    current: watch::Sender<Option<Session>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            credentials: Mutex::new(HashMap::new()),
            current,
        }
    }

    fn issue(&self, user_email: UserEmail) -> Session {
        let session = Session {
            user_email,
            id_token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        info!(user = %session.user_email, "session issued");
        self.current.send_replace(Some(session.clone()));
        session
    }

    fn parse_email(email: &str) -> Result<UserEmail, AuthError> {
        UserEmail::try_from(email).map_err(|err| AuthError::MalformedEmail(err.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user_email = Self::parse_email(email)?;
        {
            let credentials = self.credentials.lock().unwrap();
            match credentials.get(user_email.as_str()) {
                Some(stored) if stored == password => (),
                _ => return Err(AuthError::InvalidCredentials),
            }
        }
        Ok(self.issue(user_email))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user_email = Self::parse_email(email)?;
        {
            let mut credentials = self.credentials.lock().unwrap();
            if credentials.contains_key(user_email.as_str()) {
                return Err(AuthError::EmailAlreadyRegistered(
                    user_email.as_str().to_string(),
                ));
            }
            credentials.insert(user_email.as_str().to_string(), password.to_string());
        }
        Ok(self.issue(user_email))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }

    fn session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    fn on_session_change(&self) -> SessionEvents {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_registers_and_signs_in() {
        // GIVEN
        let provider = MemoryIdentityProvider::new();

        // WHEN
        let session = provider.sign_up("a@x.com", "secret1").await.unwrap();

        // THEN
        assert_eq!(session.user_email.as_str(), "a@x.com");
        assert!(!session.is_expired());
        assert_eq!(provider.session(), Some(session));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider.sign_up("a@x.com", "secret1").await.unwrap();

        let err = provider.sign_up("a@x.com", "secret2").await.unwrap_err();
        assert_eq!(err, AuthError::EmailAlreadyRegistered("a@x.com".to_string()));
    }

    #[tokio::test]
    async fn test_sign_in_verifies_credentials() {
        let provider = MemoryIdentityProvider::new();
        provider.sign_up("a@x.com", "secret1").await.unwrap();
        provider.sign_out().await.unwrap();

        assert_eq!(
            provider.sign_in("a@x.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            provider.sign_in("b@y.com", "secret1").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert!(provider.session().is_none());

        let session = provider.sign_in("a@x.com", "secret1").await.unwrap();
        assert_eq!(session.user_email.as_str(), "a@x.com");
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected() {
        let provider = MemoryIdentityProvider::new();
        assert!(matches!(
            provider.sign_up("nobody", "secret1").await.unwrap_err(),
            AuthError::MalformedEmail(_)
        ));
    }

    #[tokio::test]
    async fn test_session_changes_are_published() {
        // GIVEN
        let provider = MemoryIdentityProvider::new();
        let mut events = provider.on_session_change();
        assert!(events.borrow_and_update().is_none());

        // WHEN sign in
        provider.sign_up("a@x.com", "secret1").await.unwrap();

        // THEN
        events.changed().await.unwrap();
        assert!(events.borrow_and_update().is_some());

        // WHEN sign out
        provider.sign_out().await.unwrap();

        // THEN
        events.changed().await.unwrap();
        assert!(events.borrow_and_update().is_none());
    }
}
