//! The storage contract consumed by the paste pipelines.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::error::{Result, StoreError};
use crate::keys::{KeyGenerator, MAX_KEY_ATTEMPTS};

/// Which medium a backend persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    File,
    Sqlite,
    Postgres,
    Redis,
    ObjectStore,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Memory => "memory",
            BackendKind::File => "file",
            BackendKind::Sqlite => "sqlite",
            BackendKind::Postgres => "postgres",
            BackendKind::Redis => "redis",
            BackendKind::ObjectStore => "object_store",
        };
        f.write_str(name)
    }
}

/// Opaque put/get storage keyed by generated identifiers.
///
/// Implementations must be safe to call from many sessions at once and must
/// uphold two rules:
/// - `put` never returns a key for data it did not fully persist, and never
///   overwrites a blob already stored under a key.
/// - `get` writes exactly the stored bytes, or fails with
///   [`StoreError::NotFound`] when nothing is stored under the key.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Consume `reader` to EOF and persist it under a freshly generated key.
    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String>;

    /// Write the blob stored under `key` into `sink`.
    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()>;

    /// Cheap liveness probe against the underlying medium.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Drain a reader into memory, for media that take whole values.
pub(crate) async fn read_all(reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Run `try_insert` with fresh keys until one is accepted.
///
/// `try_insert` resolves to `Ok(false)` when the key is already taken.
pub(crate) async fn insert_with_fresh_key<F, Fut>(
    keys: &KeyGenerator,
    mut try_insert: F,
) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for _ in 0..MAX_KEY_ATTEMPTS {
        let key = keys.generate();
        if try_insert(key.clone()).await? {
            return Ok(key);
        }
        tracing::debug!(key = %key, "generated key already taken, retrying");
    }
    Err(StoreError::KeyExhausted(MAX_KEY_ATTEMPTS))
}
