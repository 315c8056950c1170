// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: initialize, unlock, store, retrieve, list, remove, clear.
//!
//! The vault is two blobs behind a [`BlobStore`]: metadata (salt, KDF
//! parameters, canary, counters) and the encrypted record set. Every write
//! touching both goes through `put_atomic`. The unlocked session key is held
//! here and never handed to callers.

use std::sync::Arc;

use credvault_core::{BlobStore, Clock, SystemClock, VaultError};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::context::MasterKeyContext;
use crate::events::{self, EVENT_CHANNEL_CAPACITY, VaultEvent};
use crate::kdf;
use crate::lockout::LockoutState;
use crate::metrics::SecurityMetrics;
use crate::model::{FORMAT_VERSION, META_KEY, RECORDS_KEY, RecordSet, VaultMetadata};
use crate::settings::VaultSettings;
use crate::strength;
use crate::validator::{self, ServiceClass};

/// Listing entry for one stored secret. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub service_id: String,
    pub class: ServiceClass,
    pub record_version: u32,
}

/// Encrypted credential vault over a blob store.
pub struct VaultStore {
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) settings: VaultSettings,
    pub(crate) clock: Arc<dyn Clock>,
    /// Guards every operation touching durable state; `Some` while unlocked.
    pub(crate) session: Mutex<Option<MasterKeyContext>>,
    pub(crate) events: broadcast::Sender<VaultEvent>,
}

impl std::fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultStore")
            .field("blobs", &self.blobs.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl VaultStore {
    pub fn new(blobs: Arc<dyn BlobStore>, settings: VaultSettings) -> Self {
        Self::with_clock(blobs, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        blobs: Arc<dyn BlobStore>,
        settings: VaultSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            blobs,
            settings,
            clock,
            session: Mutex::new(None),
            events,
        }
    }

    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Receive rotation reminders and lockout notices.
    pub fn subscribe(&self) -> broadcast::Receiver<VaultEvent> {
        self.events.subscribe()
    }

    /// Whether vault metadata exists in the store. Checked fresh every call.
    pub async fn is_initialized(&self) -> Result<bool, VaultError> {
        Ok(self.blobs.get(META_KEY).await?.is_some())
    }

    pub async fn is_unlocked(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Create a new vault protected by `password` and leave it unlocked.
    pub async fn initialize(&self, password: &SecretString) -> Result<VaultMetadata, VaultError> {
        let mut session = self.session.lock().await;

        if self.load_meta().await?.is_some() {
            return Err(VaultError::AlreadyInitialized);
        }
        strength::check(password.expose_secret(), self.settings.min_password_score)?;

        let salt = kdf::generate_salt()?;
        let ctx = MasterKeyContext::derive(password, salt, self.settings.kdf).await?;
        let now = self.clock.now();
        let meta = VaultMetadata {
            format_version: FORMAT_VERSION,
            kdf_salt: salt.to_vec(),
            kdf_params: self.settings.kdf,
            canary: ctx.seal_canary()?,
            created_at: now,
            rotation_count: 0,
            last_rotation_at: now,
            last_access_at: now,
            failed_attempt_count: 0,
            locked_until: None,
        };

        self.write_vault(&meta, &RecordSet::empty()).await?;
        *session = Some(ctx);

        info!(store = self.blobs.name(), "vault created");
        Ok(meta)
    }

    /// Derive the key for `password` and open a session.
    ///
    /// Failed attempts count toward lockout. While locked, even the correct
    /// password is refused with [`VaultError::Locked`].
    pub async fn unlock(&self, password: &SecretString) -> Result<(), VaultError> {
        let mut session = self.session.lock().await;

        let mut meta = self.require_meta().await?;
        let now = self.clock.now();
        let policy = self.settings.lockout;

        if let LockoutState::Locked { until } = policy.state(&meta, now) {
            warn!(%until, "unlock refused while locked out");
            return Err(VaultError::Locked { until });
        }

        let ctx = MasterKeyContext::derive(password, meta.salt_array()?, meta.kdf_params).await?;
        match ctx.verify_canary(&meta) {
            Ok(()) => {}
            Err(VaultError::Decryption(_)) => {
                let locked_until = policy.record_failure(&mut meta, now);
                self.blobs.put(META_KEY, meta.encode()?).await?;
                warn!(
                    failed_attempts = meta.failed_attempt_count,
                    "failed unlock attempt"
                );
                if let Some(until) = locked_until {
                    warn!(%until, failed_attempts = meta.failed_attempt_count, "vault locked out");
                    events::publish(
                        &self.events,
                        VaultEvent::LockedOut {
                            until,
                            failed_attempts: meta.failed_attempt_count,
                        },
                    );
                }
                return Err(VaultError::InvalidPassword);
            }
            Err(e) => return Err(e),
        }

        policy.record_success(&mut meta);
        meta.last_access_at = now;
        self.blobs.put(META_KEY, meta.encode()?).await?;
        *session = Some(ctx);
        info!("vault unlocked");

        let metrics = SecurityMetrics::project(&meta, 0, now, self.settings.rotation_reminder);
        if metrics.rotation_due {
            info!(
                days_since_rotation = metrics.days_since_rotation,
                "master password rotation is due"
            );
            events::publish(
                &self.events,
                VaultEvent::RotationReminder {
                    last_rotation_at: metrics.last_rotation_at,
                    days_since_rotation: metrics.days_since_rotation,
                },
            );
        }
        Ok(())
    }

    /// Drop the session key. Idempotent.
    pub async fn lock(&self) {
        if self.session.lock().await.take().is_some() {
            info!("vault locked");
        }
    }

    /// Encrypt and store `secret` for `service_id`, replacing any previous one.
    pub async fn store_secret(
        &self,
        service_id: &str,
        secret: &SecretString,
    ) -> Result<(), VaultError> {
        let session = self.session.lock().await;
        let ctx = session.as_ref().ok_or(VaultError::NotUnlocked)?;

        validator::validate_service_id(service_id)?;
        let class = ServiceClass::for_service_id(service_id);
        let verdict = validator::validate_format(class, secret.expose_secret());
        if !verdict.valid {
            return Err(VaultError::InvalidFormat {
                service_id: service_id.to_string(),
                reason: verdict.reason.unwrap_or_default(),
            });
        }

        let mut meta = self.require_meta().await?;
        let mut records = self.load_records().await?;
        let record_version = records
            .records
            .get(service_id)
            .map_or(1, |r| r.record_version.saturating_add(1));

        let record =
            ctx.seal_record(service_id, secret.expose_secret().as_bytes(), record_version)?;
        records.records.insert(service_id.to_string(), record);
        meta.last_access_at = self.clock.now();

        self.write_vault(&meta, &records).await?;
        debug!(service_id, record_version, "secret stored");
        Ok(())
    }

    /// Decrypt the secret stored for `service_id`.
    pub async fn get_secret(&self, service_id: &str) -> Result<SecretString, VaultError> {
        let session = self.session.lock().await;
        let ctx = session.as_ref().ok_or(VaultError::NotUnlocked)?;

        let mut meta = self.require_meta().await?;
        let records = self.load_records().await?;
        let record = records
            .records
            .get(service_id)
            .ok_or_else(|| VaultError::NotFound(service_id.to_string()))?;

        let plaintext = ctx.open_record(record)?;
        let secret = std::str::from_utf8(&plaintext)
            .map_err(|_| VaultError::Corrupted(format!("record `{service_id}` is not UTF-8")))?;
        let secret = SecretString::from(secret.to_string());

        meta.last_access_at = self.clock.now();
        self.blobs.put(META_KEY, meta.encode()?).await?;
        debug!(service_id, "secret retrieved");
        Ok(secret)
    }

    pub async fn remove_secret(&self, service_id: &str) -> Result<(), VaultError> {
        let session = self.session.lock().await;
        if session.is_none() {
            return Err(VaultError::NotUnlocked);
        }

        let mut meta = self.require_meta().await?;
        let mut records = self.load_records().await?;
        if records.records.remove(service_id).is_none() {
            return Err(VaultError::NotFound(service_id.to_string()));
        }
        meta.last_access_at = self.clock.now();

        self.write_vault(&meta, &records).await?;
        debug!(service_id, "secret removed");
        Ok(())
    }

    /// List stored services without decrypting anything.
    pub async fn list_services(&self) -> Result<Vec<ServiceSummary>, VaultError> {
        let session = self.session.lock().await;
        if session.is_none() {
            return Err(VaultError::NotUnlocked);
        }

        let records = self.load_records().await?;
        Ok(records
            .records
            .values()
            .map(|r| ServiceSummary {
                service_id: r.service_id.clone(),
                class: ServiceClass::for_service_id(&r.service_id),
                record_version: r.record_version,
            })
            .collect())
    }

    /// Destroy the vault. Irreversible; does not require an unlocked session.
    ///
    /// Metadata goes first: once it is gone the vault reads as uninitialized,
    /// and a leftover record blob is overwritten by the next `initialize`.
    pub async fn clear(&self) -> Result<(), VaultError> {
        let mut session = self.session.lock().await;

        self.blobs.delete(META_KEY).await?;
        *session = None;
        self.blobs.delete(RECORDS_KEY).await?;

        info!(store = self.blobs.name(), "vault cleared");
        Ok(())
    }

    pub async fn security_metrics(&self) -> Result<SecurityMetrics, VaultError> {
        let _session = self.session.lock().await;

        let meta = self.require_meta().await?;
        let records = self.load_records().await?;
        Ok(SecurityMetrics::project(
            &meta,
            records.len(),
            self.clock.now(),
            self.settings.rotation_reminder,
        ))
    }

    pub(crate) async fn load_meta(&self) -> Result<Option<VaultMetadata>, VaultError> {
        self.blobs
            .get(META_KEY)
            .await?
            .map(|bytes| VaultMetadata::decode(&bytes))
            .transpose()
    }

    pub(crate) async fn require_meta(&self) -> Result<VaultMetadata, VaultError> {
        self.load_meta().await?.ok_or(VaultError::NotInitialized)
    }

    pub(crate) async fn load_records(&self) -> Result<RecordSet, VaultError> {
        match self.blobs.get(RECORDS_KEY).await? {
            Some(bytes) => RecordSet::decode(&bytes),
            None => Err(VaultError::Corrupted(
                "metadata present but record set missing".to_string(),
            )),
        }
    }

    pub(crate) async fn write_vault(
        &self,
        meta: &VaultMetadata,
        records: &RecordSet,
    ) -> Result<(), VaultError> {
        self.blobs.put_atomic(vault_batch(meta, records)?).await
    }
}

/// Encode both vault blobs as one atomic batch.
pub(crate) fn vault_batch(
    meta: &VaultMetadata,
    records: &RecordSet,
) -> Result<Vec<(String, Vec<u8>)>, VaultError> {
    Ok(vec![
        (META_KEY.to_string(), meta.encode()?),
        (RECORDS_KEY.to_string(), records.encode()?),
    ])
}

/// Render a short preview of a secret for listings.
///
/// Values under 12 characters are fully masked.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 12 {
        return "*".repeat(8);
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
