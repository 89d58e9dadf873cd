use std::sync::Arc;

use store::{Backend, StoreError};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;

use super::PipelineError;
use crate::chain::TransformChain;

/// Bytes buffered between the backend producer and the reverse chain.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// One fetch session: stream the stored blob out of the backend and
/// reverse the chain over it. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RetrievePipeline {
    chain: Arc<TransformChain>,
    backend: Arc<dyn Backend>,
    pipe_capacity: usize,
}

impl RetrievePipeline {
    pub fn new(chain: Arc<TransformChain>, backend: Arc<dyn Backend>) -> Self {
        Self {
            chain,
            backend,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }

    pub fn with_pipe_capacity(mut self, pipe_capacity: usize) -> Self {
        self.pipe_capacity = pipe_capacity.max(1);
        self
    }

    /// Reconstruct the original bytes of the paste stored under `key`.
    ///
    /// Both the producer outcome and the reverse chain outcome are observed
    /// before returning; a backend failure wins over a transform failure
    /// since the latter is usually a symptom of the former.
    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let (mut writer, mut reader) = tokio::io::duplex(self.pipe_capacity);
        let (result_tx, result_rx) = oneshot::channel();

        let backend = Arc::clone(&self.backend);
        let producer_key = key.to_string();
        tokio::spawn(async move {
            let mut result = backend.get(&producer_key, &mut writer).await;
            if result.is_ok() {
                result = writer.shutdown().await.map_err(StoreError::from);
            }
            // EOF for the reading side
            drop(writer);
            let _ = result_tx.send(result);
        });

        let reversed = self.chain.reverse_reader(&mut reader).await;
        // a producer blocked on a full pipe sees a broken pipe and exits
        drop(reader);

        let produced = result_rx
            .await
            .map_err(|_| PipelineError::ProducerAborted)?;
        produced?;
        let payload = reversed?;

        tracing::debug!(key, size = payload.len(), "paste retrieved");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::IngestPipeline;
    use crate::settings::TransformSettings;
    use store::{KeyGenerator, MemoryBackend};

    fn chain(names: &[&str]) -> Arc<TransformChain> {
        Arc::new(TransformChain::from_names(names, &TransformSettings::default()).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_reverses_chain() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new(KeyGenerator::default()));
        let chain = chain(&["gzip", "base64"]);

        let mut input: &[u8] = b"round and round";
        let key = IngestPipeline::new(chain.clone(), backend.clone())
            .store(&mut input)
            .await
            .unwrap();

        let out = RetrievePipeline::new(chain, backend)
            .fetch(&key)
            .await
            .unwrap();
        assert_eq!(out, b"round and round");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new(KeyGenerator::default()));
        let err = RetrievePipeline::new(chain(&["gzip"]), backend)
            .fetch("nothere")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tiny_pipe_still_streams_large_blob() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new(KeyGenerator::default()));
        let chain = chain(&["base64"]);
        let payload: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();

        let mut input: &[u8] = &payload;
        let key = IngestPipeline::new(chain.clone(), backend.clone())
            .store(&mut input)
            .await
            .unwrap();

        let out = RetrievePipeline::new(chain, backend)
            .with_pipe_capacity(16)
            .fetch(&key)
            .await
            .unwrap();
        assert_eq!(out, payload);
    }
}
