// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end vault tests.
//!
//! `TestHarness` assembles a [`VaultStore`] over either a [`MemoryBlobStore`]
//! or a temp-directory SQLite database, optionally wrapped in a
//! [`FaultyStore`], with a [`ManualClock`] the test drives.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use credvault_core::{BlobStore, ManualClock, VaultError};
use credvault_storage::{MemoryBlobStore, SqliteBlobStore};
use credvault_vault::VaultSettings;
use credvault_vault::VaultStore;
use credvault_vault::kdf::{KdfAlgorithm, KdfParams};
use credvault_vault::model::{META_KEY, RECORDS_KEY};
use secrecy::SecretString;

use crate::faulty_store::FaultyStore;

/// Vault settings with low Argon2id cost so tests run quickly.
pub fn test_settings() -> VaultSettings {
    VaultSettings {
        kdf: KdfParams {
            algorithm: KdfAlgorithm::Argon2id,
            memory_cost: 32768,
            iterations: 2,
            parallelism: 1,
        },
        ..VaultSettings::default()
    }
}

enum Backend {
    Memory(Arc<MemoryBlobStore>),
    Sqlite {
        store: Arc<SqliteBlobStore>,
        path: PathBuf,
    },
}

impl Backend {
    fn as_blob_store(&self) -> Arc<dyn BlobStore> {
        match self {
            Self::Memory(store) => store.clone() as Arc<dyn BlobStore>,
            Self::Sqlite { store, .. } => store.clone() as Arc<dyn BlobStore>,
        }
    }
}

fn assemble(
    backend: &Backend,
    faults: bool,
    settings: VaultSettings,
    clock: &Arc<ManualClock>,
) -> (Arc<VaultStore>, Option<Arc<FaultyStore>>) {
    let mut blobs = backend.as_blob_store();
    let mut faulty = None;
    if faults {
        let store = Arc::new(FaultyStore::new(blobs));
        blobs = store.clone();
        faulty = Some(store);
    }
    let vault = Arc::new(VaultStore::with_clock(blobs, settings, clock.clone()));
    (vault, faulty)
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    sqlite: bool,
    faults: bool,
    settings: VaultSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            sqlite: false,
            faults: false,
            settings: test_settings(),
        }
    }

    /// Back the vault with a SQLite file in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Wrap the backend in a [`FaultyStore`].
    pub fn with_faults(mut self) -> Self {
        self.faults = true;
        self
    }

    pub fn with_settings(mut self, settings: VaultSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the test harness, creating the backing store.
    pub async fn build(self) -> Result<TestHarness, VaultError> {
        let temp_dir = tempfile::TempDir::new().map_err(VaultError::storage)?;

        let backend = if self.sqlite {
            let path = temp_dir.path().join("vault.db");
            let store = Arc::new(SqliteBlobStore::open(&path).await?);
            Backend::Sqlite { store, path }
        } else {
            Backend::Memory(Arc::new(MemoryBlobStore::new()))
        };

        let clock = Arc::new(ManualClock::default());
        let (vault, faulty) = assemble(&backend, self.faults, self.settings, &clock);
        Ok(TestHarness {
            vault,
            faulty,
            clock,
            settings: self.settings,
            faults: self.faults,
            backend,
            _temp_dir: temp_dir,
        })
    }
}

/// A vault wired to controllable storage and time.
pub struct TestHarness {
    /// The vault under test.
    pub vault: Arc<VaultStore>,
    /// Fault injector, present when built `with_faults`.
    pub faulty: Option<Arc<FaultyStore>>,
    /// Clock shared with the vault.
    pub clock: Arc<ManualClock>,
    settings: VaultSettings,
    faults: bool,
    backend: Backend,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// In-memory harness with default test settings.
    pub async fn memory() -> Result<Self, VaultError> {
        Self::builder().build().await
    }

    /// Path of the SQLite database, when SQLite-backed.
    pub fn database_path(&self) -> Option<&PathBuf> {
        match &self.backend {
            Backend::Sqlite { path, .. } => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Simulate a process restart: drop the vault and reopen its storage.
    ///
    /// SQLite backends close and reopen the database file; in-memory
    /// backends keep their map. The new vault starts locked.
    pub async fn reopen(&mut self) -> Result<(), VaultError> {
        if let Backend::Sqlite { store, path } = &self.backend {
            store.close().await?;
            let path = path.clone();
            let store = Arc::new(SqliteBlobStore::open(&path).await?);
            self.backend = Backend::Sqlite { store, path };
        }
        let (vault, faulty) = assemble(&self.backend, self.faults, self.settings, &self.clock);
        self.vault = vault;
        self.faulty = faulty;
        Ok(())
    }

    /// Raw bytes of both vault blobs, read through the backend directly.
    pub async fn snapshot(&self) -> Result<BTreeMap<String, Option<Vec<u8>>>, VaultError> {
        let blobs = self.backend.as_blob_store();
        let mut snapshot = BTreeMap::new();
        for key in [META_KEY, RECORDS_KEY] {
            snapshot.insert(key.to_string(), blobs.get(key).await?);
        }
        Ok(snapshot)
    }
}

/// Wrap a password or secret literal.
pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
