use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use common::prelude::TransformSettings;
use store::BackendConfig;
use url::Url;

use crate::state::AppConfig;

/// Resolved runtime configuration for one daemon process.
#[derive(Debug, Clone)]
pub struct Config {
    // listeners
    /// raw socket upload listener
    pub listen_addr: SocketAddr,
    /// http retrieve server
    pub http_listen_addr: SocketAddr,

    /// prefix for returned paste urls, without a trailing slash
    pub domain: String,

    // session limits
    pub size_limit_bytes: usize,
    pub idle_timeout: Duration,

    // storage
    pub key_length: usize,
    pub backend: BackendConfig,

    pub transform: TransformSettings,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl TryFrom<&AppConfig> for Config {
    type Error = ConfigError;

    fn try_from(app: &AppConfig) -> Result<Self, Self::Error> {
        let domain = Url::parse(&app.domain)?;
        if domain.cannot_be_a_base() {
            return Err(ConfigError::Domain(app.domain.clone()));
        }

        let log_level = tracing::Level::from_str(&app.log_level)
            .map_err(|_| ConfigError::LogLevel(app.log_level.clone()))?;

        if app.idle_timeout_secs == 0 {
            return Err(ConfigError::IdleTimeout);
        }

        Ok(Self {
            listen_addr: app.listen_addr,
            http_listen_addr: app.http_listen_addr,
            domain: app.domain.trim_end_matches('/').to_string(),
            size_limit_bytes: app.size_limit_bytes,
            idle_timeout: Duration::from_secs(app.idle_timeout_secs),
            key_length: app.key_length,
            backend: app.backend.clone(),
            transform: app.transform.clone(),
            log_level,
            log_dir: app.log_dir.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid domain URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("domain '{0}' cannot prefix paste paths")]
    Domain(String),
    #[error("invalid log level '{0}'")]
    LogLevel(String),
    #[error("idle_timeout_secs must be greater than zero")]
    IdleTimeout,
}
