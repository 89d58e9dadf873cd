//! Raw socket upload listener.
//!
//! One TCP connection carries one paste: the client writes the payload and
//! half-closes, the server answers with `<domain>/<key>` (or
//! `Error storing paste: <reason>`) and closes.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::ServiceState;

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);
/// Unread input consumed before replying to a rejected upload, so closing
/// the socket does not reset the connection under the reply.
const DRAIN_LIMIT: u64 = 1024 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Leads every reply to an upload that could not be stored.
pub const STORE_ERROR_PREFIX: &str = "Error storing paste: ";

/// Bind `listen_addr` and serve uploads until shutdown is signalled.
pub async fn run(
    listen_addr: SocketAddr,
    state: ServiceState,
    shutdown_rx: watch::Receiver<()>,
) -> Result<(), PasteServerError> {
    let listener = TcpListener::bind(listen_addr).await?;
    serve(listener, state, shutdown_rx).await
}

/// Serve uploads on an already bound listener. In-flight sessions are
/// allowed to finish after shutdown is signalled.
pub async fn serve(
    listener: TcpListener,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), PasteServerError> {
    tracing::info!(addr = ?listener.local_addr()?, "paste listener accepting uploads");
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    sessions.spawn(handle_connection(state.clone(), stream, peer));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
            _ = shutdown_rx.changed() => break,
        }
    }

    tracing::debug!(in_flight = sessions.len(), "paste listener draining sessions");
    while sessions.join_next().await.is_some() {}
    Ok(())
}

#[tracing::instrument(skip(state, stream))]
async fn handle_connection(state: ServiceState, mut stream: TcpStream, peer: SocketAddr) {
    let (mut reader, mut writer) = stream.split();

    let reply = match state.ingest().store(&mut reader).await {
        Ok(key) => state.paste_url(&key),
        Err(e) => {
            tracing::warn!(error = %e, "failed to store paste");
            let mut limited = (&mut reader).take(DRAIN_LIMIT);
            let mut sink = tokio::io::sink();
            let _ = timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut limited, &mut sink)).await;
            format!("{}{}", STORE_ERROR_PREFIX, e)
        }
    };

    if let Err(e) = writer.write_all(reply.as_bytes()).await {
        tracing::debug!(error = %e, "failed to send reply");
        return;
    }
    let _ = writer.shutdown().await;
}

#[derive(Debug, thiserror::Error)]
pub enum PasteServerError {
    #[error("an error occurred running the paste listener: {0}")]
    ServingFailed(#[from] std::io::Error),
}
