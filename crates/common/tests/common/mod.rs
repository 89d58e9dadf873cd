//! Shared test utilities for pipeline integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ::common::prelude::*;
use async_trait::async_trait;
use store::{Backend, BackendKind, KeyGenerator, MemoryBackend};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

pub const AES_SECRET: &str = "integration test secret";

/// Settings with secrets for both ciphers
pub fn settings() -> TransformSettings {
    TransformSettings {
        aes: Some(CipherSettings {
            key: AES_SECRET.to_string(),
        }),
        chacha20: Some(CipherSettings {
            key: "another integration secret".to_string(),
        }),
        ..Default::default()
    }
}

pub fn chain(names: &[&str]) -> Arc<TransformChain> {
    Arc::new(TransformChain::from_names(names, &settings()).unwrap())
}

/// Build a matching ingest/retrieve pair over one backend
pub fn pipelines(
    names: &[&str],
    backend: Arc<dyn Backend>,
) -> (IngestPipeline, RetrievePipeline) {
    let chain = chain(names);
    (
        IngestPipeline::new(chain.clone(), backend.clone()),
        RetrievePipeline::new(chain, backend),
    )
}

pub fn memory_backend() -> Arc<dyn Backend> {
    Arc::new(MemoryBackend::new(KeyGenerator::default()))
}

/// Memory backend that sleeps before every put and between every chunk it
/// writes on get, so concurrent sessions interleave.
#[derive(Debug, Clone)]
pub struct SlowBackend {
    inner: MemoryBackend,
    latency: Duration,
    chunk_size: usize,
}

impl SlowBackend {
    pub fn new(latency: Duration, chunk_size: usize) -> Self {
        Self {
            inner: MemoryBackend::new(KeyGenerator::default()),
            latency,
            chunk_size,
        }
    }
}

#[async_trait]
impl Backend for SlowBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> store::Result<String> {
        tokio::time::sleep(self.latency).await;
        self.inner.put(reader).await
    }

    async fn get(
        &self,
        key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> store::Result<()> {
        let mut blob = Vec::new();
        self.inner.get(key, &mut blob).await?;

        for chunk in blob.chunks(self.chunk_size) {
            tokio::time::sleep(self.latency).await;
            sink.write_all(chunk).await?;
        }
        sink.flush().await?;
        Ok(())
    }
}

/// Backend whose `get` writes a fixed prefix and then fails, as a disk
/// dying halfway through a read would.
#[derive(Debug, Clone)]
pub struct PartialThenFail {
    prefix: Vec<u8>,
}

impl PartialThenFail {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Backend for PartialThenFail {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn put(&self, _reader: &mut (dyn AsyncRead + Send + Unpin)) -> store::Result<String> {
        Err(store::StoreError::Io(std::io::Error::other("read only")))
    }

    async fn get(
        &self,
        _key: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> store::Result<()> {
        let _ = sink.write_all(&self.prefix).await;
        Err(store::StoreError::Io(std::io::Error::other("disk died")))
    }
}
