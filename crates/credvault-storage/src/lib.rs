// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob storage adapters for the credvault vault.
//!
//! Two implementations of [`credvault_core::BlobStore`]:
//! - [`SqliteBlobStore`]: WAL-mode SQLite behind a single `tokio-rusqlite`
//!   writer thread; atomic batches are one transaction.
//! - [`MemoryBlobStore`]: a process-local map, for tests and ephemeral use.

pub mod database;
pub mod memory;
pub mod sqlite;

pub use memory::MemoryBlobStore;
pub use sqlite::SqliteBlobStore;
