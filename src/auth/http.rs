use std::convert::TryFrom;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;
use url::Url;

use super::{AuthError, IdentityProvider, Session, SessionEvents};
use crate::config::HttpBackendConfig;
use crate::model::UserEmail;

const SIGN_IN_ENDPOINT: &str = "v1/accounts:signInWithPassword";
const SIGN_UP_ENDPOINT: &str = "v1/accounts:signUp";

/// REST client for the managed identity provider. Tokens are issued and
/// verified remotely; this side only relays credentials and publishes the
/// resulting session.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    identity_url: Url,
    api_key: String,
    current: watch::Sender<Option<Session>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    id_token: String,
    email: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl HttpIdentityProvider {
    pub fn new(cfg: &HttpBackendConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_millis))
            .build()
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let (current, _) = watch::channel(None);

        Ok(Self {
            client,
            identity_url: cfg.identity_url.clone(),
            api_key: cfg.api_key.clone(),
            current,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, AuthError> {
        let mut url = self
            .identity_url
            .join(name)
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn request_session(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = self.endpoint(endpoint)?;
        let response = self
            .client
            .post(url)
            .json(&CredentialRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        let user_email = UserEmail::try_from(body.email.as_str())
            .map_err(|err| AuthError::MalformedEmail(err.to_string()))?;
        let expires_in: i64 = body.expires_in.parse().unwrap_or(3600);

        let session = Session {
            user_email,
            id_token: body.id_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        };
        info!(user = %session.user_email, "session issued");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn map_error(response: reqwest::Response) -> AuthError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(err) => return AuthError::Transport(err.to_string()),
        };
        match message.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "INVALID_EMAIL" => AuthError::MalformedEmail(message),
            "EMAIL_EXISTS" => AuthError::EmailAlreadyRegistered(message),
            "TOKEN_EXPIRED" => AuthError::SessionExpired,
            _ => AuthError::Transport(message),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.request_session(SIGN_IN_ENDPOINT, email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.request_session(SIGN_UP_ENDPOINT, email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // token revocation is the provider's concern, locally the session
        // just ends
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
