// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting blob store for atomicity tests.
//!
//! `FaultyStore` forwards to an inner [`BlobStore`] until told to fail. A
//! failed write never reaches the inner store, matching an adapter whose
//! transaction rolled back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use credvault_core::{BlobStore, VaultError};
use tokio::sync::Mutex;

pub struct FaultyStore {
    inner: Arc<dyn BlobStore>,
    fail_next_atomic: AtomicBool,
    fail_puts: AtomicBool,
    failing_deletes: Mutex<Vec<String>>,
    atomic_batches: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self {
            inner,
            fail_next_atomic: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            failing_deletes: Mutex::new(Vec::new()),
            atomic_batches: AtomicUsize::new(0),
        }
    }

    /// Make the next `put_atomic` fail without writing anything.
    pub fn fail_next_atomic(&self) {
        self.fail_next_atomic.store(true, Ordering::SeqCst);
    }

    /// Fail every `put` and `put_atomic` until cleared.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Fail every `delete` of `key`, leaving it in place.
    pub async fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().await.push(key.to_string());
    }

    /// Number of atomic batches that reached the inner store.
    pub fn atomic_batches(&self) -> usize {
        self.atomic_batches.load(Ordering::SeqCst)
    }

    fn injected(operation: &str) -> VaultError {
        VaultError::storage(format!("injected {operation} failure"))
    }
}

#[async_trait]
impl BlobStore for FaultyStore {
    fn name(&self) -> &str {
        "faulty"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), VaultError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected("put"));
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), VaultError> {
        if self.failing_deletes.lock().await.iter().any(|k| k == key) {
            return Err(Self::injected("delete"));
        }
        self.inner.delete(key).await
    }

    async fn put_atomic(&self, writes: Vec<(String, Vec<u8>)>) -> Result<(), VaultError> {
        if self.fail_next_atomic.swap(false, Ordering::SeqCst)
            || self.fail_puts.load(Ordering::SeqCst)
        {
            return Err(Self::injected("atomic batch"));
        }
        self.inner.put_atomic(writes).await?;
        self.atomic_batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
