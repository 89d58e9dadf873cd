use std::sync::Arc;

use common::prelude::{IngestPipeline, RetrievePipeline, TransformChain, TransformError};
use store::{Backend, KeyGenerator, StoreError};

use crate::service_config::Config;

/// Main service state, shared by the paste listener and the HTTP server.
///
/// The transform chain and the backend are built once here and injected
/// into every session; nothing else is global.
#[derive(Debug, Clone)]
pub struct State {
    ingest: IngestPipeline,
    retrieve: RetrievePipeline,
    backend: Arc<dyn Backend>,
    domain: Arc<str>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Transform chain; a bad name must fail before any listener starts
        let chain = Arc::new(TransformChain::from_settings(&config.transform)?);
        tracing::info!(transforms = ?chain.names(), "transform chain ready");

        // 2. Storage backend
        let keys = KeyGenerator::new(config.key_length)?;
        let backend = config.backend.connect(keys).await?;

        let ingest = IngestPipeline::new(chain.clone(), backend.clone())
            .with_size_limit(config.size_limit_bytes)
            .with_idle_timeout(config.idle_timeout);
        let retrieve = RetrievePipeline::new(chain, backend.clone());

        Ok(Self {
            ingest,
            retrieve,
            backend,
            domain: config.domain.as_str().into(),
        })
    }

    /// Assemble state from parts that are already built.
    pub fn new(
        ingest: IngestPipeline,
        retrieve: RetrievePipeline,
        backend: Arc<dyn Backend>,
        domain: &str,
    ) -> Self {
        Self {
            ingest,
            retrieve,
            backend,
            domain: domain.trim_end_matches('/').into(),
        }
    }

    pub fn ingest(&self) -> &IngestPipeline {
        &self.ingest
    }

    pub fn retrieve(&self) -> &RetrievePipeline {
        &self.retrieve
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The URL an uploader receives for `key`.
    pub fn paste_url(&self, key: &str) -> String {
        format!("{}/{}", self.domain, key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("transform setup failed: {0}")]
    Transform(#[from] TransformError),
    #[error("storage setup failed: {0}")]
    Store(#[from] StoreError),
}
