use std::sync::Arc;
use std::time::Duration;

use store::Backend;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use super::PipelineError;
use crate::chain::TransformChain;
use crate::transform::TransformError;

/// 50 KiB
pub const DEFAULT_SIZE_LIMIT: usize = 50 * 1024;
const READ_CHUNK: usize = 8 * 1024;

/// One store session: read raw bytes, forward them through the chain, and
/// hand the result to the backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    chain: Arc<TransformChain>,
    backend: Arc<dyn Backend>,
    size_limit: usize,
    idle_timeout: Option<Duration>,
}

impl IngestPipeline {
    pub fn new(chain: Arc<TransformChain>, backend: Arc<dyn Backend>) -> Self {
        Self {
            chain,
            backend,
            size_limit: DEFAULT_SIZE_LIMIT,
            idle_timeout: None,
        }
    }

    /// Largest accepted payload, in bytes, before any transform runs.
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Abort the session if a single read waits longer than `idle_timeout`.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Run a full store session and return the key of the new paste.
    ///
    /// Nothing reaches the backend unless the whole payload was read and
    /// transformed, so a failed session never leaves a partial paste.
    pub async fn store<R>(&self, reader: &mut R) -> Result<String, PipelineError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let payload = self.read_bounded(reader).await?;
        let size = payload.len();

        let transformed = self.chain.forward(payload)?;
        let stored_size = transformed.len();

        let mut blob: &[u8] = &transformed;
        let key = self.backend.put(&mut blob).await?;

        tracing::info!(key = %key, size, stored_size, "paste stored");
        Ok(key)
    }

    /// Read at most `size_limit + 1` bytes; hitting that bound is an error
    /// rather than a truncation.
    async fn read_bounded<R>(&self, reader: &mut R) -> Result<Vec<u8>, PipelineError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let mut limited = reader.take((self.size_limit as u64).saturating_add(1));
        let mut payload = Vec::new();

        loop {
            payload.reserve(READ_CHUNK);
            let read = limited.read_buf(&mut payload);
            let n = match self.idle_timeout {
                Some(idle) => timeout(idle, read)
                    .await
                    .map_err(|_| PipelineError::IdleTimeout {
                        secs: idle.as_secs(),
                    })?,
                None => read.await,
            }
            .map_err(TransformError::StreamRead)?;

            if n == 0 {
                break;
            }
            if payload.len() > self.size_limit {
                return Err(PipelineError::PayloadTooLarge {
                    limit: self.size_limit,
                });
            }
        }

        Ok(payload)
    }
}
