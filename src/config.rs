use serde::Deserialize;
use std::io::Read;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::*;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error {0} when reading config")]
    IoError(#[from] std::io::Error),
    #[error("cannot open config file '{0}' : {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("UTF8 format error when reading config")]
    Utf8Error,
    #[error("format error {0} when reading config")]
    FormatError(#[from] serde_yaml::Error),
}

/// Paths the route guard and account flows navigate to.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub login: String,
    pub dashboard: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            dashboard: "/".to_string(),
        }
    }
}

/// Transport-level retry policy for the HTTP backend.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub interval_ms: u64,
    pub max_interval_ms: u64,
}

impl RetryConfig {
    pub fn new(max_retries: u32, interval_ms: u64, max_interval_ms: u64) -> Self {
        Self {
            max_retries,
            interval_ms,
            max_interval_ms,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig::new(3, 200, 5000)
    }
}

#[derive(Clone, Deserialize)]
pub struct HttpBackendConfig {
    pub identity_url: Url,
    pub store_url: Url,
    pub api_key: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
    #[serde(default = "default_poll_interval_millis")]
    pub poll_interval_millis: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_collection() -> String {
    "tasks".to_string()
}

fn default_timeout_millis() -> u64 {
    3000
}

fn default_poll_interval_millis() -> u64 {
    1000
}

#[derive(Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BackendConfig {
    Memory,
    Http(HttpBackendConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub log: Option<crate::log::Log>,
    pub backend: BackendConfig,
    pub routes: RoutesConfig,
}

impl Config {
    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(&s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let p = path.as_ref();
        let mut file = File::open(p).map_err(|e| ConfigError::OpeningError(p.to_owned(), e))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        let contents = String::from_utf8(contents).map_err(|_| ConfigError::Utf8Error)?;
        let config = Config::from_str(&contents)?;
        Ok(config)
    }
}

pub mod testdata {
    use super::Config;

    #[allow(dead_code)]
    pub fn test_config() -> Config {
        Config::from_str(
            r#"
        log:
            level: trace
            backend:
                type: Stdout
            structured: false
        routes:
            login: /login
            dashboard: /
        backend:
            type: Http
            identity_url: "http://localhost:9099/identitytoolkit/"
            store_url: "http://localhost:8080/"
            api_key: demo-key
            collection: tasks
            timeout_millis: 3000
            poll_interval_millis: 250
            retry:
                max_retries: 3
                interval_ms: 100
                max_interval_ms: 2000
        "#,
        )
        .unwrap()
    }
}
