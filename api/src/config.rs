//! Service configuration
//! Loaded from environment variables (and `.env` in development)

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::session::SessionConfig;

const MIN_SESSION_IDLE_SECS: u64 = 60;
const MAX_SESSION_IDLE_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidConfig(format!("Unknown log format: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub session: SessionConfig,
    /// Optional JSON catalogue merged over the embedded English messages
    pub locale_file: Option<PathBuf>,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session: SessionConfig::default(),
            locale_file: None,
            log_format: LogFormat::Pretty,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(addr.clone()))?;
        }

        if let Some(raw) = lookup("SESSION_IDLE_SECONDS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid session idle timeout: {raw} ({e})"))
            })?;
            if !(MIN_SESSION_IDLE_SECS..=MAX_SESSION_IDLE_SECS).contains(&secs) {
                return Err(ConfigError::InvalidConfig(format!(
                    "Session idle timeout must be between {MIN_SESSION_IDLE_SECS} and {MAX_SESSION_IDLE_SECS} seconds"
                )));
            }
            config.session.idle_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("SESSION_MAX_CAPACITY") {
            config.session.max_capacity = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid session capacity: {raw} ({e})"))
            })?;
        }

        config.locale_file = lookup("LOCALE_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = raw.parse()?;
        }

        if let Some(raw) = lookup("CORS_ORIGINS") {
            config.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn log_summary(&self) {
        info!(
            "Configuration loaded: bind_addr={}, session_idle={:?}, locale_file={:?}, cors_origins={}",
            self.bind_addr,
            self.session.idle_timeout,
            self.locale_file,
            self.cors_origins.join(",")
        );
    }
}
