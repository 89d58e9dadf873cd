//! Process-local paste storage.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::backend::{insert_with_fresh_key, read_all, Backend, BackendKind};
use crate::error::{Result, StoreError};
use crate::keys::{ensure_valid_key, KeyGenerator};

/// Keeps every paste in a shared map. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pastes: Arc<RwLock<HashMap<String, Bytes>>>,
    keys: KeyGenerator,
}

impl MemoryBackend {
    pub fn new(keys: KeyGenerator) -> Self {
        Self {
            pastes: Arc::default(),
            keys,
        }
    }

    /// Number of stored pastes.
    pub fn len(&self) -> usize {
        self.pastes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pastes.read().is_empty()
    }

    fn try_insert(&self, key: String, data: Bytes) -> bool {
        match self.pastes.write().entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(data);
                true
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
        let data = Bytes::from(read_all(reader).await?);
        let size = data.len();
        let key = insert_with_fresh_key(&self.keys, |key| {
            let inserted = self.try_insert(key, data.clone());
            async move { Ok(inserted) }
        })
        .await?;

        tracing::debug!(key = %key, size, "paste stored in memory");
        Ok(key)
    }

    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()> {
        ensure_valid_key(key)?;
        // Clone out of the lock so it is not held across the write.
        let data = self
            .pastes
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        sink.write_all(&data).await?;
        sink.flush().await?;
        Ok(())
    }
}
