// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory blob store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use credvault_core::{BlobStore, VaultError};

/// A [`BlobStore`] backed by a `HashMap`.
///
/// Atomic batches are applied while holding the map's lock, so readers never
/// observe half of a batch.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored key/value pair, for byte-level assertions.
    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.blobs.lock().await.clone()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), VaultError> {
        self.blobs.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), VaultError> {
        self.blobs.lock().await.remove(key);
        Ok(())
    }

    async fn put_atomic(&self, writes: Vec<(String, Vec<u8>)>) -> Result<(), VaultError> {
        let mut blobs = self.blobs.lock().await;
        blobs.extend(writes);
        Ok(())
    }
}
