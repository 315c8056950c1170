// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password rotation.
//!
//! Rotation re-encrypts every record under a key derived from the new
//! password and a fresh salt. The complete new vault is staged in memory and
//! committed with a single `put_atomic`, so durable state is either entirely
//! old or entirely new.

use chrono::{DateTime, Utc};
use credvault_core::VaultError;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::context::MasterKeyContext;
use crate::kdf;
use crate::lockout::LockoutState;
use crate::model::{RecordSet, VaultMetadata};
use crate::store::{VaultStore, vault_batch};
use crate::strength;

/// Outcome of a successful rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationReport {
    pub rotation_count: u32,
    pub records_rotated: usize,
}

/// A decrypted record awaiting re-encryption.
struct Plaintext {
    service_id: String,
    record_version: u32,
    value: Zeroizing<Vec<u8>>,
}

/// Fully re-encrypted vault, not yet visible to readers.
#[derive(Debug)]
pub(crate) struct StagedVault {
    pub(crate) meta: VaultMetadata,
    pub(crate) records: RecordSet,
}

impl StagedVault {
    fn build(
        new_ctx: &MasterKeyContext,
        current: &VaultMetadata,
        plaintexts: &[Plaintext],
        now: DateTime<Utc>,
    ) -> Result<Self, VaultError> {
        let mut records = RecordSet::empty();
        for p in plaintexts {
            let record = new_ctx.seal_record(&p.service_id, &p.value, p.record_version)?;
            records.records.insert(p.service_id.clone(), record);
        }

        let meta = VaultMetadata {
            kdf_salt: new_ctx.salt().to_vec(),
            kdf_params: *new_ctx.params(),
            canary: new_ctx.seal_canary()?,
            rotation_count: current.rotation_count.saturating_add(1),
            last_rotation_at: now,
            last_access_at: now,
            failed_attempt_count: 0,
            locked_until: None,
            ..current.clone()
        };

        Ok(Self { meta, records })
    }
}

/// Map a decryption failure under the old key to a password rejection.
fn reject_old_password(e: VaultError) -> VaultError {
    match e {
        VaultError::Decryption(_) => VaultError::InvalidPassword,
        other => other,
    }
}

impl VaultStore {
    /// Re-encrypt the whole vault under `new_password`.
    ///
    /// Nothing is written unless `old_password` opens the canary and every
    /// record and `new_password` meets the strength policy. A failed commit
    /// leaves the previous vault and the current session in place.
    pub async fn rotate(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<RotationReport, VaultError> {
        let mut session = self.session.lock().await;

        let meta = self.require_meta().await?;
        let now = self.clock.now();
        if let LockoutState::Locked { until } = self.settings.lockout.state(&meta, now) {
            warn!(%until, "rotation refused while locked out");
            return Err(VaultError::Locked { until });
        }
        let records = self.load_records().await?;

        let old_ctx =
            MasterKeyContext::derive(old_password, meta.salt_array()?, meta.kdf_params).await?;
        old_ctx.verify_canary(&meta).map_err(reject_old_password)?;

        let mut plaintexts = Vec::with_capacity(records.len());
        for record in records.records.values() {
            let value = old_ctx.open_record(record).map_err(reject_old_password)?;
            plaintexts.push(Plaintext {
                service_id: record.service_id.clone(),
                record_version: record.record_version,
                value,
            });
        }
        drop(old_ctx);

        strength::check(
            new_password.expose_secret(),
            self.settings.min_password_score,
        )?;

        let new_ctx =
            MasterKeyContext::derive(new_password, kdf::generate_salt()?, self.settings.kdf)
                .await?;
        let staged = StagedVault::build(&new_ctx, &meta, &plaintexts, now)?;
        drop(plaintexts);

        self.blobs
            .put_atomic(vault_batch(&staged.meta, &staged.records)?)
            .await?;
        *session = Some(new_ctx);

        let report = RotationReport {
            rotation_count: staged.meta.rotation_count,
            records_rotated: staged.records.len(),
        };
        info!(
            rotation_count = report.rotation_count,
            records_rotated = report.records_rotated,
            "master password rotated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use credvault_core::ManualClock;
    use credvault_storage::MemoryBlobStore;

    use super::*;
    use crate::kdf::{KdfAlgorithm, KdfParams};
    use crate::settings::VaultSettings;

    const OLD: &str = "Tr0ub4dor&3xyz!";
    const NEW: &str = "N3wP@ssphrase#99";

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn low_cost() -> KdfParams {
        KdfParams {
            algorithm: KdfAlgorithm::Argon2id,
            memory_cost: 32768,
            iterations: 2,
            parallelism: 1,
        }
    }

    async fn populated() -> (VaultStore, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let settings = VaultSettings {
            kdf: low_cost(),
            ..VaultSettings::default()
        };
        let store =
            VaultStore::with_clock(blobs.clone(), settings, Arc::new(ManualClock::default()));
        store.initialize(&secret(OLD)).await.unwrap();
        store
            .store_secret("image-search", &secret("abc123"))
            .await
            .unwrap();
        store
            .store_secret("ai-generation", &secret("sk-0123456789abcdefghij"))
            .await
            .unwrap();
        (store, blobs)
    }

    #[tokio::test]
    async fn rotation_reencrypts_every_record() {
        let (store, blobs) = populated().await;
        let before = blobs.snapshot().await;

        let report = store.rotate(&secret(OLD), &secret(NEW)).await.unwrap();
        assert_eq!(
            report,
            RotationReport {
                rotation_count: 1,
                records_rotated: 2
            }
        );
        assert!(store.is_unlocked().await);
        assert_eq!(
            store.get_secret("image-search").await.unwrap().expose_secret(),
            "abc123"
        );

        let after = blobs.snapshot().await;
        let old_set = RecordSet::decode(&before[crate::model::RECORDS_KEY]).unwrap();
        let new_set = RecordSet::decode(&after[crate::model::RECORDS_KEY]).unwrap();
        for (id, old_record) in &old_set.records {
            let new_record = &new_set.records[id];
            assert_ne!(old_record.ciphertext, new_record.ciphertext);
            assert_ne!(old_record.nonce, new_record.nonce);
            assert_eq!(old_record.record_version, new_record.record_version);
        }

        store.lock().await;
        assert!(matches!(
            store.unlock(&secret(OLD)).await,
            Err(VaultError::InvalidPassword)
        ));
        store.unlock(&secret(NEW)).await.unwrap();
        assert_eq!(
            store
                .get_secret("ai-generation")
                .await
                .unwrap()
                .expose_secret(),
            "sk-0123456789abcdefghij"
        );
    }

    #[tokio::test]
    async fn wrong_old_password_writes_nothing() {
        let (store, blobs) = populated().await;
        let before = blobs.snapshot().await;

        let err = store
            .rotate(&secret("Wr0ng&Password!"), &secret(NEW))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidPassword));
        assert_eq!(blobs.snapshot().await, before);
        assert_eq!(
            store.security_metrics().await.unwrap().failed_attempt_count,
            0
        );
    }

    #[tokio::test]
    async fn weak_new_password_writes_nothing() {
        let (store, blobs) = populated().await;
        let before = blobs.snapshot().await;

        let err = store
            .rotate(&secret(OLD), &secret("qwerty12"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::WeakPassword { .. }));
        assert_eq!(blobs.snapshot().await, before);
    }

    #[tokio::test]
    async fn rotation_upgrades_kdf_params() {
        let (store, blobs) = populated().await;
        let mut upgraded = low_cost();
        upgraded.iterations = 3;
        let store = VaultStore::with_clock(
            blobs.clone(),
            VaultSettings {
                kdf: upgraded,
                ..*store.settings()
            },
            Arc::new(ManualClock::default()),
        );

        store.rotate(&secret(OLD), &secret(NEW)).await.unwrap();
        let meta = store.load_meta().await.unwrap().unwrap();
        assert_eq!(meta.kdf_params, upgraded);
        assert_eq!(meta.rotation_count, 1);
    }

    #[tokio::test]
    async fn rotation_resets_rotation_age() {
        let (store, _) = populated().await;
        let created = store.security_metrics().await.unwrap().created_at;
        store.rotate(&secret(OLD), &secret(NEW)).await.unwrap();

        let metrics = store.security_metrics().await.unwrap();
        assert_eq!(metrics.created_at, created);
        assert_eq!(metrics.rotation_count, 1);
        assert_eq!(metrics.days_since_rotation, 0);
    }
}
