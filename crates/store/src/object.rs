//! Object storage backend (S3/MinIO/local filesystem/memory).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutMode};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::backend::{insert_with_fresh_key, read_all, Backend, BackendKind};
use crate::error::{Result, StoreError};
use crate::keys::{ensure_valid_key, KeyGenerator};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum ObjectStoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Bucket name
        bucket: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

/// Stores each paste as the object `pastes/<key>`.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    inner: Arc<dyn ObjectStore>,
    keys: KeyGenerator,
}

impl ObjectStoreBackend {
    /// Create a new storage backend from configuration.
    pub async fn new(config: &ObjectStoreConfig, keys: KeyGenerator) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match config {
            ObjectStoreConfig::Memory => Arc::new(InMemory::new()),

            ObjectStoreConfig::Local { path } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(path).await?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }

            ObjectStoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                let builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );

                // Fail fast if the bucket doesn't exist
                let first = {
                    let prefix = ObjectPath::from("");
                    let mut stream = store.list(Some(&prefix));
                    stream.try_next().await
                };
                match first {
                    Ok(_) => {}
                    Err(object_store::Error::NotFound { .. }) => {
                        return Err(StoreError::BucketNotFound(bucket.clone()));
                    }
                    Err(e) => {
                        let msg = e.to_string();
                        if msg.contains("NoSuchBucket") {
                            return Err(StoreError::BucketNotFound(bucket.clone()));
                        }
                        return Err(e.into());
                    }
                }

                store
            }
        };

        Ok(Self { inner, keys })
    }

    /// Build the object path for a paste.
    fn paste_path(key: &str) -> ObjectPath {
        ObjectPath::from(format!("pastes/{}", key))
    }

    /// Write `data` at `path` unless an object is already there.
    ///
    /// Stores without conditional writes fall back to a `head` check.
    async fn create(&self, path: &ObjectPath, data: Bytes) -> Result<bool> {
        match self
            .inner
            .put_opts(path, data.clone().into(), PutMode::Create.into())
            .await
        {
            Ok(_) => Ok(true),
            Err(object_store::Error::AlreadyExists { .. }) => Ok(false),
            Err(object_store::Error::NotImplemented) => {
                if self.exists(path).await? {
                    return Ok(false);
                }
                self.inner.put(path, data.into()).await?;
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        match self.inner.head(path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Backend for ObjectStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStore
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
        let data = Bytes::from(read_all(reader).await?);
        let size = data.len();
        let key = insert_with_fresh_key(&self.keys, |key| {
            let data = data.clone();
            async move { self.create(&Self::paste_path(&key), data).await }
        })
        .await?;

        tracing::debug!(key = %key, size, "paste stored in object storage");
        Ok(key)
    }

    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()> {
        ensure_valid_key(key)?;
        let path = Self::paste_path(key);
        let result = match self.inner.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut chunks = result.into_stream();
        while let Some(chunk) = chunks.try_next().await? {
            sink.write_all(&chunk).await?;
        }
        sink.flush().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.exists(&Self::paste_path("ping")).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let backend = ObjectStoreBackend::new(&ObjectStoreConfig::Memory, KeyGenerator::default())
            .await
            .unwrap();

        let mut input: &[u8] = b"hello world";
        let key = backend.put(&mut input).await.unwrap();

        let mut out = Vec::new();
        backend.get(&key, &mut out).await.unwrap();
        assert_eq!(out, b"hello world");

        backend.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ObjectStoreConfig::Local {
            path: temp_dir.path().to_path_buf(),
        };
        let backend = ObjectStoreBackend::new(&config, KeyGenerator::default())
            .await
            .unwrap();

        let mut input: &[u8] = b"test data";
        let key = backend.put(&mut input).await.unwrap();

        let mut out = Vec::new();
        backend.get(&key, &mut out).await.unwrap();
        assert_eq!(out, b"test data");

        // Verify file exists on disk
        let file_path = temp_dir.path().join("pastes").join(&key);
        assert!(file_path.exists());
    }

    #[tokio::test]
    async fn test_create_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let configs = [
            ObjectStoreConfig::Memory,
            ObjectStoreConfig::Local {
                path: temp_dir.path().to_path_buf(),
            },
        ];

        for config in &configs {
            let backend = ObjectStoreBackend::new(config, KeyGenerator::default())
                .await
                .unwrap();
            let path = ObjectStoreBackend::paste_path("taken1");

            assert!(backend.create(&path, Bytes::from_static(b"first")).await.unwrap());
            assert!(!backend.create(&path, Bytes::from_static(b"second")).await.unwrap());

            let mut out = Vec::new();
            backend.get("taken1", &mut out).await.unwrap();
            assert_eq!(out, b"first");
        }
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let backend = ObjectStoreBackend::new(&ObjectStoreConfig::Memory, KeyGenerator::default())
            .await
            .unwrap();

        let mut out = Vec::new();
        let err = backend.get("absent", &mut out).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_config_deserializes_tagged() {
        let config: ObjectStoreConfig =
            serde_json::from_str(r#"{"store": "local", "path": "/tmp/pastes"}"#).unwrap();
        assert_eq!(
            config,
            ObjectStoreConfig::Local {
                path: PathBuf::from("/tmp/pastes")
            }
        );
    }
}
