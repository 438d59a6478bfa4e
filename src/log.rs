use serde::Deserialize;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

#[derive(Clone, Deserialize)]
#[serde(tag = "type")]
pub enum LogBackend {
    Syslog {
        process: Option<String>,
        hostname: Option<String>,
    },
    Stdout,
}

#[derive(Clone, Deserialize)]
pub struct Log {
    pub level: String,
    pub structured: bool,
    pub backend: LogBackend,
}

/// setup log from an optional environment filter and the config file
///
/// if the environment filter is present, then the config level is not used
pub fn setup(
    env_filter: Result<EnvFilter, tracing_subscriber::filter::FromEnvError>,
    config: &Option<Log>,
) {
    let filter = match env_filter {
        Ok(env_filter) => env_filter,
        Err(_) => match config {
            Some(log) => EnvFilter::new(log.level.clone()),
            None => EnvFilter::new("info"),
        },
    };

    let sbuilder = Subscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc3339())
        .with_level(true)
        .with_env_filter(filter);
    let ss = sbuilder.with_ansi(true).finish();
    tracing::subscriber::set_global_default(ss)
        .expect("setting tracing default subscriber failed");
}
