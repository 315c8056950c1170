// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only security metrics derived from vault metadata.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::model::VaultMetadata;

/// Default interval after which rotation is recommended.
pub const DEFAULT_ROTATION_REMINDER: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Snapshot of the vault's security posture.
///
/// Always computed from [`VaultMetadata`]; there is no separate counter
/// store that could drift from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityMetrics {
    pub created_at: DateTime<Utc>,
    pub rotation_count: u32,
    pub last_rotation_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub failed_attempt_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub is_locked: bool,
    pub record_count: usize,
    pub days_since_rotation: i64,
    pub rotation_due: bool,
}

impl SecurityMetrics {
    pub fn project(
        meta: &VaultMetadata,
        record_count: usize,
        now: DateTime<Utc>,
        reminder: Duration,
    ) -> Self {
        let since_rotation = now.signed_duration_since(meta.last_rotation_at);
        let reminder = TimeDelta::from_std(reminder).unwrap_or(TimeDelta::MAX);

        Self {
            created_at: meta.created_at,
            rotation_count: meta.rotation_count,
            last_rotation_at: meta.last_rotation_at,
            last_access_at: meta.last_access_at,
            failed_attempt_count: meta.failed_attempt_count,
            locked_until: meta.locked_until,
            is_locked: meta.locked_until.is_some_and(|until| until > now),
            record_count,
            days_since_rotation: since_rotation.num_days().max(0),
            rotation_due: since_rotation > reminder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::{KdfAlgorithm, KdfParams};
    use crate::model::{FORMAT_VERSION, VaultRecord};

    fn meta_rotated_at(at: DateTime<Utc>) -> VaultMetadata {
        VaultMetadata {
            format_version: FORMAT_VERSION,
            kdf_salt: vec![0u8; 16],
            kdf_params: KdfParams {
                algorithm: KdfAlgorithm::Argon2id,
                memory_cost: 32768,
                iterations: 2,
                parallelism: 1,
            },
            canary: VaultRecord {
                service_id: "canary".into(),
                ciphertext: vec![],
                nonce: vec![0u8; 12],
                record_version: 1,
            },
            created_at: at,
            rotation_count: 2,
            last_rotation_at: at,
            last_access_at: at,
            failed_attempt_count: 1,
            locked_until: None,
        }
    }

    #[test]
    fn fresh_vault_is_not_due() {
        let now = Utc::now();
        let metrics =
            SecurityMetrics::project(&meta_rotated_at(now), 3, now, DEFAULT_ROTATION_REMINDER);
        assert_eq!(metrics.days_since_rotation, 0);
        assert!(!metrics.rotation_due);
        assert!(!metrics.is_locked);
        assert_eq!(metrics.record_count, 3);
        assert_eq!(metrics.rotation_count, 2);
        assert_eq!(metrics.failed_attempt_count, 1);
    }

    #[test]
    fn due_only_after_interval_passes() {
        let rotated = Utc::now();
        let meta = meta_rotated_at(rotated);

        let at_interval = rotated + TimeDelta::days(90);
        let exact = SecurityMetrics::project(&meta, 0, at_interval, DEFAULT_ROTATION_REMINDER);
        assert_eq!(exact.days_since_rotation, 90);
        assert!(!exact.rotation_due);

        let past = at_interval + TimeDelta::seconds(1);
        assert!(SecurityMetrics::project(&meta, 0, past, DEFAULT_ROTATION_REMINDER).rotation_due);
    }

    #[test]
    fn expired_lock_is_not_reported_as_locked() {
        let now = Utc::now();
        let mut meta = meta_rotated_at(now);
        meta.locked_until = Some(now + TimeDelta::seconds(30));
        assert!(SecurityMetrics::project(&meta, 0, now, DEFAULT_ROTATION_REMINDER).is_locked);

        let later = now + TimeDelta::seconds(31);
        let metrics = SecurityMetrics::project(&meta, 0, later, DEFAULT_ROTATION_REMINDER);
        assert!(!metrics.is_locked);
        assert_eq!(metrics.locked_until, meta.locked_until);
    }
}
