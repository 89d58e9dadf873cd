//! Shared helpers for daemon integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use ::common::prelude::*;
use pasted_daemon::ServiceState;
use store::{Backend, BackendKind, KeyGenerator, MemoryBackend, StoreError};
use tokio::io::{AsyncRead, AsyncWrite};

pub const DOMAIN: &str = "http://paste.test";
pub const AES_SECRET: &str = "daemon test secret";

pub fn settings() -> TransformSettings {
    TransformSettings {
        aes: Some(CipherSettings {
            key: AES_SECRET.to_string(),
        }),
        ..Default::default()
    }
}

pub fn memory_backend() -> Arc<dyn Backend> {
    Arc::new(MemoryBackend::new(KeyGenerator::default()))
}

/// Service state over `backend`, with one chain shared by both pipelines.
pub fn state_with(names: &[&str], backend: Arc<dyn Backend>, size_limit: usize) -> ServiceState {
    let chain = Arc::new(TransformChain::from_names(names, &settings()).unwrap());
    let ingest = IngestPipeline::new(chain.clone(), backend.clone()).with_size_limit(size_limit);
    let retrieve = RetrievePipeline::new(chain, backend.clone());
    ServiceState::new(ingest, retrieve, backend, DOMAIN)
}

pub fn state(names: &[&str]) -> ServiceState {
    state_with(names, memory_backend(), 50 * 1024)
}

/// Store a paste directly through the ingest pipeline.
pub async fn store_paste(state: &ServiceState, payload: &[u8]) -> String {
    let mut reader = payload;
    state.ingest().store(&mut reader).await.unwrap()
}

/// Backend that is never reachable.
#[derive(Debug)]
pub struct DownBackend;

#[async_trait]
impl Backend for DownBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn put(&self, _reader: &mut (dyn AsyncRead + Send + Unpin)) -> store::Result<String> {
        Err(unreachable_error())
    }

    async fn get(
        &self,
        _key: &str,
        _sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> store::Result<()> {
        Err(unreachable_error())
    }

    async fn ping(&self) -> store::Result<()> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "backend down",
    ))
}
