use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use pasted_daemon::paste_server::STORE_ERROR_PREFIX;
use pasted_daemon::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// File to upload (reads stdin if omitted)
    pub file: Option<PathBuf>,

    /// Upload listener to connect to (default: `listen_addr` from config)
    #[arg(long)]
    pub addr: Option<SocketAddr>,
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("daemon rejected paste: {0}")]
    Rejected(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Put {
    type Error = PutError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => dialable(AppState::load(ctx.config_path.clone())?.config.listen_addr),
        };

        let payload = match &self.file {
            Some(path) => tokio::fs::read(path).await?,
            None => {
                let mut buf = Vec::new();
                tokio::io::stdin().read_to_end(&mut buf).await?;
                buf
            }
        };

        let mut stream = TcpStream::connect(addr).await?;
        stream.write_all(&payload).await?;
        // end of stream marks the end of the paste
        stream.shutdown().await?;

        let mut reply = String::new();
        stream.read_to_string(&mut reply).await?;

        match reply.strip_prefix(STORE_ERROR_PREFIX) {
            Some(reason) => Err(PutError::Rejected(reason.trim().to_string())),
            None => Ok(reply),
        }
    }
}

/// A listener bound to the unspecified address is reached over loopback.
fn dialable(addr: SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => {
            SocketAddr::from((Ipv4Addr::LOCALHOST, v4.port()))
        }
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => {
            SocketAddr::from((Ipv6Addr::LOCALHOST, v6.port()))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_listen_addr_dials_loopback() {
        assert_eq!(
            dialable("0.0.0.0:4000".parse().unwrap()),
            "127.0.0.1:4000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            dialable("[::]:4000".parse().unwrap()),
            "[::1]:4000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            dialable("10.0.0.5:4000".parse().unwrap()),
            "10.0.0.5:4000".parse::<SocketAddr>().unwrap()
        );
    }
}
