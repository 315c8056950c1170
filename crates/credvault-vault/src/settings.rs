// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime policy handed to the vault store.

use std::time::Duration;

use credvault_config::CredvaultConfig;

use crate::kdf::KdfParams;
use crate::lockout::LockoutPolicy;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Vault policy resolved from [`CredvaultConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultSettings {
    /// Parameters for new vaults and rotations. Unlock always uses the
    /// parameters persisted in the metadata.
    pub kdf: KdfParams,
    pub min_password_score: u8,
    pub lockout: LockoutPolicy,
    pub rotation_reminder: Duration,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self::from(&CredvaultConfig::default())
    }
}

impl From<&CredvaultConfig> for VaultSettings {
    fn from(config: &CredvaultConfig) -> Self {
        Self {
            kdf: KdfParams::from(&config.kdf),
            min_password_score: config.policy.min_password_score,
            lockout: LockoutPolicy::from(&config.lockout),
            rotation_reminder: Duration::from_secs(
                u64::from(config.policy.rotation_reminder_days) * SECS_PER_DAY,
            ),
        }
    }
}
