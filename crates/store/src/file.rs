//! One-file-per-paste storage under a root directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::backend::{insert_with_fresh_key, Backend, BackendKind};
use crate::error::{Result, StoreError};
use crate::keys::{ensure_valid_key, KeyGenerator};

const UPLOAD_PREFIX: &str = ".upload-";
const UPLOAD_SUFFIX_LENGTH: usize = 16;

/// Stores each paste as `<root>/<key>`.
///
/// Uploads land in a hidden temporary file first and are published with a
/// hard link, which fails instead of replacing an existing paste. Readers
/// therefore never see a half-written blob.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    keys: KeyGenerator,
}

impl FileBackend {
    /// Open (and create if needed) a file backend rooted at `root`.
    pub async fn new(root: impl Into<PathBuf>, keys: KeyGenerator) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root, keys })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paste_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn upload_path(&self) -> PathBuf {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(UPLOAD_SUFFIX_LENGTH)
            .map(char::from)
            .collect();
        self.root.join(format!("{}{}", UPLOAD_PREFIX, suffix))
    }

    async fn write_upload(
        &self,
        upload: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let mut file = fs::File::create(upload).await?;
        let written = tokio::io::copy(reader, &mut file).await?;
        file.sync_all().await?;
        Ok(written)
    }

    async fn publish(&self, upload: &Path) -> Result<String> {
        insert_with_fresh_key(&self.keys, |key| {
            let target = self.paste_path(&key);
            async move {
                match fs::hard_link(upload, &target).await {
                    Ok(()) => Ok(true),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
                    Err(e) => Err(e.into()),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
        let upload = self.upload_path();

        let result = match self.write_upload(&upload, reader).await {
            Ok(size) => self.publish(&upload).await.map(|key| (key, size)),
            Err(e) => Err(e),
        };

        // The published paste (if any) keeps its own link to the data.
        if let Err(e) = fs::remove_file(&upload).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = ?upload, error = %e, "failed to remove upload file");
            }
        }

        let (key, size) = result?;
        tracing::debug!(key = %key, size, root = ?self.root, "paste stored on disk");
        Ok(key)
    }

    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()> {
        ensure_valid_key(key)?;

        let mut file = match fs::File::open(self.paste_path(key)).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        tokio::io::copy(&mut file, sink).await?;
        sink.flush().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let meta = fs::metadata(&self.root).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Path(self.root.clone()))
        }
    }
}
