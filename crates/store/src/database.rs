//! Relational paste storage (SQLite or Postgres) over sqlx pools.

use std::path::Path;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::backend::{insert_with_fresh_key, read_all, Backend, BackendKind};
use crate::error::{Result, StoreError};
use crate::keys::{ensure_valid_key, KeyGenerator};

#[derive(Debug, Clone)]
enum Pool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Stores pastes as rows of a `pastes (id, data)` table.
#[derive(Debug, Clone)]
pub struct DatabaseBackend {
    pool: Pool,
    keys: KeyGenerator,
}

impl DatabaseBackend {
    /// Open a SQLite database file, creating it if missing.
    pub async fn sqlite(path: &Path, keys: KeyGenerator, create_tables: bool) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::setup(Pool::Sqlite(pool), keys, create_tables).await
    }

    /// Create an in-memory SQLite database. Always creates the table.
    pub async fn sqlite_in_memory(keys: KeyGenerator) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal);

        // Every connection to :memory: is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::setup(Pool::Sqlite(pool), keys, true).await
    }

    /// Connect to Postgres with a libpq-style connection string.
    pub async fn postgres(url: &str, keys: KeyGenerator, create_tables: bool) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Self::setup(Pool::Postgres(pool), keys, create_tables).await
    }

    async fn setup(pool: Pool, keys: KeyGenerator, create_tables: bool) -> Result<Self> {
        let backend = Self { pool, keys };
        if create_tables {
            backend.create_tables().await?;
        }
        Ok(backend)
    }

    async fn create_tables(&self) -> Result<()> {
        match &self.pool {
            Pool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS pastes (
                        id TEXT PRIMARY KEY,
                        data BLOB NOT NULL
                    )
                    "#,
                )
                .execute(pool)
                .await?;
            }
            Pool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS pastes (
                        id TEXT PRIMARY KEY,
                        data BYTEA NOT NULL
                    )
                    "#,
                )
                .execute(pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Insert a row; `Ok(false)` when the id is already taken.
    async fn insert_paste(&self, key: &str, data: &[u8]) -> Result<bool> {
        let result = match &self.pool {
            Pool::Sqlite(pool) => {
                sqlx::query("INSERT INTO pastes (id, data) VALUES (?, ?)")
                    .bind(key)
                    .bind(data)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
            Pool::Postgres(pool) => {
                sqlx::query("INSERT INTO pastes (id, data) VALUES ($1, $2)")
                    .bind(key)
                    .bind(data)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
        };

        match result {
            Ok(()) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_paste(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row = match &self.pool {
            Pool::Sqlite(pool) => sqlx::query("SELECT data FROM pastes WHERE id = ?")
                .bind(key)
                .fetch_optional(pool)
                .await?
                .map(|r| r.get::<Vec<u8>, _>("data")),
            Pool::Postgres(pool) => sqlx::query("SELECT data FROM pastes WHERE id = $1")
                .bind(key)
                .fetch_optional(pool)
                .await?
                .map(|r| r.get::<Vec<u8>, _>("data")),
        };
        Ok(row)
    }
}

#[async_trait]
impl Backend for DatabaseBackend {
    fn kind(&self) -> BackendKind {
        match self.pool {
            Pool::Sqlite(_) => BackendKind::Sqlite,
            Pool::Postgres(_) => BackendKind::Postgres,
        }
    }

    async fn put(&self, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<String> {
        let data = read_all(reader).await?;
        let payload = data.as_slice();
        let key = insert_with_fresh_key(&self.keys, |key| async move {
            self.insert_paste(&key, payload).await
        })
        .await?;

        tracing::debug!(key = %key, size = data.len(), backend = %self.kind(), "paste row inserted");
        Ok(key)
    }

    async fn get(&self, key: &str, sink: &mut (dyn AsyncWrite + Send + Unpin)) -> Result<()> {
        ensure_valid_key(key)?;
        let data = self
            .fetch_paste(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        sink.write_all(&data).await?;
        sink.flush().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        match &self.pool {
            Pool::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Pool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl DatabaseBackend {
    /// Count stored pastes.
    pub async fn count_pastes(&self) -> Result<i64> {
        let count: i64 = match &self.pool {
            Pool::Sqlite(pool) => sqlx::query("SELECT COUNT(*) as count FROM pastes")
                .fetch_one(pool)
                .await?
                .get("count"),
            Pool::Postgres(pool) => sqlx::query("SELECT COUNT(*) as count FROM pastes")
                .fetch_one(pool)
                .await?
                .get("count"),
        };
        Ok(count)
    }
}
