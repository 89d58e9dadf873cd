use std::net::SocketAddr;

use clap::Args;

use pasted_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Upload listener address (default: 0.0.0.0:4000)
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// HTTP retrieve server address (default: 0.0.0.0:8080)
    #[arg(long)]
    pub http_listen_addr: Option<SocketAddr>,

    /// Prefix for returned paste URLs (default: http://localhost:8080)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config_path = AppState::config_path(ctx.config_path.clone())?;

        let mut config = AppConfig::for_config_path(&config_path);
        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(addr) = self.http_listen_addr {
            config.http_listen_addr = addr;
        }
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }

        let state = AppState::init(Some(config_path), Some(config))?;

        let output = format!(
            "Initialized pasted config at: {}\n\
             - Upload listen address: {}\n\
             - HTTP listen address: {}\n\
             - Domain: {}\n\
             - Backend: {:?}",
            state.config_path.display(),
            state.config.listen_addr,
            state.config.http_listen_addr,
            state.config.domain,
            state.config.backend,
        );

        Ok(output)
    }
}
