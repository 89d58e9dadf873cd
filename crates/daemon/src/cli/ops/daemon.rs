use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use pasted_daemon::service_config::ConfigError;
use pasted_daemon::state::{AppState, StateError};
use pasted_daemon::{spawn_service, ServiceConfig, ServiceError};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override the upload listener address (default from config)
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Override the HTTP retrieve server address (default from config)
    #[arg(long)]
    pub http_listen_addr: Option<SocketAddr>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("daemon failed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.pasted/config.toml)
        let state = AppState::load(ctx.config_path.clone())?;
        let mut config = ServiceConfig::try_from(&state.config)?;

        // Flags win over the config file
        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(addr) = self.http_listen_addr {
            config.http_listen_addr = addr;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir.clone();
        }

        spawn_service(&config).await?;
        Ok("daemon ended".to_string())
    }
}
