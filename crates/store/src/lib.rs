//! Paste storage backends
//!
//! This crate provides the storage side of `pasted`: an opaque
//! `put(bytes) -> key` / `get(key) -> bytes` contract ([`Backend`]) and the
//! media it can be satisfied by.
//!
//! # Features
//!
//! - Random alphanumeric keys with collision retry
//! - Multiple storage backends: memory, filesystem, SQLite, Postgres, Redis,
//!   and object storage (S3/MinIO/local filesystem/memory)
//! - Explicit [`StoreError::NotFound`] for missing keys on every medium
//!
//! # Example
//!
//! ```rust,no_run
//! use store::{BackendConfig, KeyGenerator};
//!
//! # async fn example() -> Result<(), store::StoreError> {
//! let config = BackendConfig::File { root: "/tmp/pastes".into() };
//! let backend = config.connect(KeyGenerator::default()).await?;
//!
//! let mut input: &[u8] = b"hello";
//! let key = backend.put(&mut input).await?;
//!
//! let mut out = Vec::new();
//! backend.get(&key, &mut out).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod database;
mod error;
mod file;
mod keys;
mod kv;
mod memory;
mod object;

pub use backend::{Backend, BackendKind};
pub use config::BackendConfig;
pub use database::DatabaseBackend;
pub use error::{Result, StoreError};
pub use file::FileBackend;
pub use keys::{is_valid_key, KeyGenerator, DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH, MIN_KEY_LENGTH};
pub use kv::RedisBackend;
pub use memory::MemoryBackend;
pub use object::{ObjectStoreBackend, ObjectStoreConfig};
