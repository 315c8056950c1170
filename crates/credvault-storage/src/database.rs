// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and schema.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use credvault_core::VaultError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Schema for the blob table. Idempotent.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vault_blobs (
    key        TEXT PRIMARY KEY NOT NULL,
    value      BLOB NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Open (or create) the database at `path`, apply PRAGMAs and the schema.
pub async fn open(path: impl AsRef<Path>) -> Result<Connection, VaultError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(VaultError::storage)?;
    }

    let conn = Connection::open(path).await.map_err(VaultError::storage)?;
    prepare(&conn, true).await?;
    debug!(path = %path.display(), "vault database opened");
    Ok(conn)
}

/// Open a private in-memory database with the schema applied.
pub async fn open_in_memory() -> Result<Connection, VaultError> {
    let conn = Connection::open_in_memory()
        .await
        .map_err(VaultError::storage)?;
    prepare(&conn, false).await?;
    Ok(conn)
}

async fn prepare(conn: &Connection, wal: bool) -> Result<(), VaultError> {
    conn.call(move |conn| -> Result<(), rusqlite::Error> {
        if wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = FULL; PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)
}

/// Convert tokio-rusqlite errors to `VaultError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultError {
    VaultError::storage(e)
}
