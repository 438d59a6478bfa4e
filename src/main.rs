mod auth;
mod config;
mod controller;
mod log;
mod model;
mod store;

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use auth::IdentityProvider;
use config::{BackendConfig, Config, ConfigError};
use controller::{
    AccountController, ControllerError, Dashboard, LogNavigator, NoticeBoard, RouteGuard,
};
use store::TaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config_path =
        env::var("TASKBOARD_CONFIG").unwrap_or_else(|_| "taskboard.yaml".to_string());
    let (config, config_err) = load_config(&config_path);

    let env_filter = EnvFilter::try_from_env("TASKBOARD_LOG");
    log::setup(env_filter, &config.log);

    info!("Starting taskboard: {}", env!("FULL_VERSION"));
    if let Some(err) = config_err {
        warn!(reason = %err, path = config_path.as_str(), "Unable to read config file, falling back to defaults.");
    }

    match config.backend.clone() {
        BackendConfig::Memory => {
            let provider = Arc::new(auth::MemoryIdentityProvider::new());
            let store = Arc::new(store::MemoryTaskStore::new());
            run(provider, store, config).await
        }
        BackendConfig::Http(http) => {
            let provider = Arc::new(auth::HttpIdentityProvider::new(&http)?);
            let store = Arc::new(store::HttpTaskStore::new(&http)?);
            run(provider, store, config).await
        }
    }
}

fn load_config(path: &str) -> (Config, Option<ConfigError>) {
    if !std::path::Path::new(path).exists() {
        return (Config::default(), None);
    }
    match Config::from_file(path) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    }
}

async fn run<P, S>(provider: Arc<P>, store: Arc<S>, config: Config) -> anyhow::Result<()>
where
    P: IdentityProvider,
    S: TaskStore,
{
    let navigator = Arc::new(LogNavigator);
    let guard = RouteGuard::new(navigator.clone(), config.routes.login.clone());
    let guard_loop = tokio::spawn(guard.run(provider.on_session_change()));

    let notices = NoticeBoard::new();
    let mut account =
        AccountController::new(provider.clone(), navigator, config.routes.clone());

    let email = env::var("TASKBOARD_EMAIL").unwrap_or_else(|_| "demo@taskboard.dev".to_string());
    let password = env::var("TASKBOARD_PASSWORD").unwrap_or_else(|_| "demo-password".to_string());

    // the in-process backend starts empty, make sure the account exists
    if matches!(config.backend, BackendConfig::Memory) {
        let _ = provider.sign_up(&email, &password).await;
    }

    if !account.sign_in(&email, &password).await {
        error!(
            reason = account.error().unwrap_or("unknown"),
            "Unable to sign in."
        );
        anyhow::bail!("sign-in failed");
    }
    let session = provider.session().ok_or(ControllerError::NotSignedIn)?;

    let dashboard = Dashboard::open(store, session.user_email.clone(), notices.clone()).await?;

    let mut tasks = dashboard.watch_tasks();
    let render_loop = tokio::spawn(async move {
        loop {
            let list = tasks.borrow_and_update().clone();
            for task in list.iter() {
                info!(
                    id = task.id.as_str(),
                    title = task.title.as_str(),
                    priority = ?task.priority,
                    completed = task.completed,
                    "task"
                );
            }
            info!(count = list.len(), "task list rendered");
            if tasks.changed().await.is_err() {
                break;
            }
        }
    });

    let mut notice_events = notices.watch();
    let notice_loop = tokio::spawn(async move {
        while notice_events.changed().await.is_ok() {
            let current = notice_events.borrow_and_update().clone();
            for notice in current.iter() {
                warn!(id = notice.id, reason = notice.message.as_str(), "notice");
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");

    render_loop.abort();
    notice_loop.abort();
    dashboard.close();
    account.sign_out().await;
    guard_loop.abort();
    Ok(())
}

#[cfg(all(test, feature = "e2e"))]
mod e2e_tests;
