use std::sync::Arc;

use tracing::info;

use crate::auth::{Session, SessionEvents};
use crate::model::UserEmail;

/// Navigation boundary. Fire-and-forget, no return value to consume.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Navigator for headless runs: navigation becomes a log line.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!(path = path, "navigate");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Identity not yet resolved. Children keep rendering; the brief flash
    /// of protected content before a redirect is accepted.
    Unknown,
    Resolved(Option<UserEmail>),
}

/// Redirects unauthenticated viewers to the login route. One identity-change
/// event drives at most one redirect.
pub struct RouteGuard<N: Navigator> {
    navigator: Arc<N>,
    login_path: String,
    state: GuardState,
}

impl<N: Navigator> RouteGuard<N> {
    pub fn new(navigator: Arc<N>, login_path: impl Into<String>) -> Self {
        Self {
            navigator,
            login_path: login_path.into(),
            state: GuardState::Unknown,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Applies one identity event: resolves the state and, when the viewer
    /// turns out to be signed out, issues the single redirect for this
    /// change.
    pub fn observe(&mut self, session: Option<&Session>) {
        self.state = GuardState::Resolved(session.map(|session| session.user_email.clone()));
        if session.is_none() {
            self.navigator.navigate(&self.login_path);
        }
    }

    /// Drives the guard from the provider's change stream until the
    /// provider goes away.
    pub async fn run(mut self, mut events: SessionEvents) {
        let current = events.borrow_and_update().clone();
        self.observe(current.as_ref());
        while events.changed().await.is_ok() {
            let session = events.borrow_and_update().clone();
            self.observe(session.as_ref());
        }
    }
}
