// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `BlobStore` trait.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use credvault_core::{BlobStore, VaultError};

use crate::database::{self, map_tr_err};

const UPSERT: &str =
    "INSERT OR REPLACE INTO vault_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)";

/// SQLite-backed blob store.
///
/// Every key is one row of `vault_blobs`. [`BlobStore::put_atomic`] runs all
/// writes inside one transaction, so a failure or crash mid-batch leaves the
/// previous rows intact.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBlobStore").finish_non_exhaustive()
    }
}

impl SqliteBlobStore {
    /// Open (or create) a store at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        Ok(Self {
            conn: database::open(path).await?,
        })
    }

    /// Open a private in-memory store.
    pub async fn open_in_memory() -> Result<Self, VaultError> {
        Ok(Self {
            conn: database::open_in_memory().await?,
        })
    }

    /// Checkpoint the WAL so the database file is self-contained.
    pub async fn close(&self) -> Result<(), VaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Vec<u8>>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM vault_blobs WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), VaultError> {
        let key = key.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(UPSERT, params![key, value, now])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, key: &str) -> Result<(), VaultError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM vault_blobs WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put_atomic(&self, writes: Vec<(String, Vec<u8>)>) -> Result<(), VaultError> {
        let count = writes.len();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(UPSERT)?;
                    for (key, value) in &writes {
                        stmt.execute(params![key, value, now])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;
        debug!(keys = count, "atomic batch committed");
        Ok(())
    }
}
