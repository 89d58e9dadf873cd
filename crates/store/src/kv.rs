//! Key-value paste storage on Redis.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::backend::{insert_with_fresh_key, read_all, Backend, BackendKind};
use crate::error::{Result, StoreError};
use crate::keys::{ensure_valid_key, KeyGenerator};

/// Stores each paste as a Redis string value, written with `SET NX`.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    prefix: String,
    keys: KeyGenerator,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("prefix", &self.prefix)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379/0`) and verify the server answers.
    pub async fn connect(url: &str, prefix: Option<String>, keys: KeyGenerator) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let backend = Self {
            conn,
            prefix: prefix.unwrap_or_default(),
            keys,
        };
        backend.ping().await?;
        Ok(backend)
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl Backend for RedisBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
        let data = read_all(reader).await?;
        let payload = data.as_slice();
        let key = insert_with_fresh_key(&self.keys, |key| {
            let redis_key = self.redis_key(&key);
            let mut conn = self.conn.clone();
            async move {
                let inserted: bool = conn.set_nx(redis_key, payload).await?;
                Ok(inserted)
            }
        })
        .await?;

        tracing::debug!(key = %key, size = data.len(), "paste stored in redis");
        Ok(key)
    }

    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()> {
        ensure_valid_key(key)?;
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(self.redis_key(key)).await?;
        let data = value.ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        sink.write_all(&data).await?;
        sink.flush().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: bool = conn.exists(self.redis_key("ping")).await?;
        Ok(())
    }
}
