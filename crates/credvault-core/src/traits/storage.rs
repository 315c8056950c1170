// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistent key-value blob stores.

use async_trait::async_trait;

use crate::error::VaultError;

/// An opaque persistent key-value blob store.
///
/// The vault only ever hands this adapter ciphertext, nonces, salts and
/// non-secret metadata. Implementations may be local (SQLite, memory) or
/// remote.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short adapter name used in log fields.
    fn name(&self) -> &str;

    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError>;

    /// Writes a single key, replacing any existing value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), VaultError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), VaultError>;

    /// Writes every `(key, value)` pair or none of them.
    ///
    /// After an error the store must be observably unchanged.
    async fn put_atomic(&self, writes: Vec<(String, Vec<u8>)>) -> Result<(), VaultError>;
}
