use std::sync::Arc;

use tracing::info;

use super::guard::Navigator;
use crate::auth::IdentityProvider;
use crate::config::RoutesConfig;

/// Login/registration flow. Auth failures are recorded verbatim for display
/// next to the form that raised them; nothing is retried.
pub struct AccountController<P: IdentityProvider, N: Navigator> {
    provider: Arc<P>,
    navigator: Arc<N>,
    routes: RoutesConfig,
    error: Option<String>,
}

impl<P: IdentityProvider, N: Navigator> AccountController<P, N> {
    pub fn new(provider: Arc<P>, navigator: Arc<N>, routes: RoutesConfig) -> Self {
        Self {
            provider,
            navigator,
            routes,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> bool {
        self.error = None;
        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                info!(user = %session.user_email, "signed in");
                self.navigator.navigate(&self.routes.dashboard);
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub async fn register(&mut self, email: &str, password: &str) -> bool {
        self.error = None;
        match self.provider.sign_up(email, password).await {
            Ok(session) => {
                info!(user = %session.user_email, "registered");
                // registration lands back on the login view
                self.navigator.navigate(&self.routes.login);
                true
            }
            Err(err) => {
                // the failure must reach the user, not vanish
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub async fn sign_out(&mut self) -> bool {
        self.error = None;
        match self.provider.sign_out().await {
            Ok(()) => {
                self.navigator.navigate(&self.routes.login);
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }
}
