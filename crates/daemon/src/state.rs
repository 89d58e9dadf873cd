use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::{fs, io};

use common::prelude::TransformSettings;
use serde::{Deserialize, Serialize};
use store::BackendConfig;

pub const APP_NAME: &str = "pasted";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PASTES_DIR_NAME: &str = "pastes";

/// On-disk configuration, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Raw socket listener accepting uploads
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// HTTP server answering `GET /{key}`
    #[serde(default = "default_http_listen_addr")]
    pub http_listen_addr: SocketAddr,
    /// Prefix for the URLs handed back to uploaders
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_size_limit_bytes")]
    pub size_limit_bytes: usize,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_key_length")]
    pub key_length: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for log files (stdout only if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// `transforms` plus the `[aes]`, `[chacha20]` and `[gzip]` tables
    #[serde(flatten)]
    pub transform: TransformSettings,

    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4000))
}

fn default_http_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_domain() -> String {
    "http://localhost:8080".to_string()
}

fn default_size_limit_bytes() -> usize {
    common::pipeline::DEFAULT_SIZE_LIMIT
}

fn default_idle_timeout_secs() -> u64 {
    30
}

fn default_key_length() -> usize {
    store::DEFAULT_KEY_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            http_listen_addr: default_http_listen_addr(),
            domain: default_domain(),
            size_limit_bytes: default_size_limit_bytes(),
            idle_timeout_secs: default_idle_timeout_secs(),
            key_length: default_key_length(),
            log_level: default_log_level(),
            log_dir: None,
            transform: TransformSettings::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, with pastes stored in a `pastes/` directory next to the
    /// config file.
    pub fn for_config_path(config_path: &Path) -> Self {
        Self {
            backend: BackendConfig::File {
                root: config_dir(config_path).join(PASTES_DIR_NAME),
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the config file path (custom or default ~/.pasted/config.toml)
    pub fn config_path(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)).join(CONFIG_FILE_NAME))
    }

    /// Write a config file, [`AppConfig::for_config_path`] unless `config`
    /// is given. Refuses to overwrite an existing one.
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path)?;

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(config_path));
        }

        fs::create_dir_all(config_dir(&config_path))?;

        let config = config.unwrap_or_else(|| AppConfig::for_config_path(&config_path));
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load an existing config file
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path)?;

        let config_toml = match fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StateError::NotInitialized(config_path))
            }
            Err(e) => return Err(e.into()),
        };
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            config_path,
            config,
        })
    }
}

fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no config at {0}. Run 'pasted init' first")]
    NotInitialized(PathBuf),

    #[error("config already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
