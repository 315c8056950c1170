// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failed-attempt lockout with exponential backoff.
//!
//! The counter lives in [`VaultMetadata`] so it survives restarts. It is not
//! reset when a lock expires: the next failure after expiry relocks at once
//! with an equal or longer backoff. Only a successful unlock or rotation
//! clears it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use credvault_config::model::LockoutConfig;

use crate::model::VaultMetadata;

/// Whether the vault currently accepts unlock attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    Unlocked { remaining_attempts: u32 },
    Locked { until: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::from(&LockoutConfig::default())
    }
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self {
            max_failed_attempts: config.max_failed_attempts,
            base_backoff: Duration::from_secs(config.base_backoff_secs),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }
}

impl LockoutPolicy {
    pub fn state(&self, meta: &VaultMetadata, now: DateTime<Utc>) -> LockoutState {
        match meta.locked_until {
            Some(until) if until > now => LockoutState::Locked { until },
            _ => LockoutState::Unlocked {
                remaining_attempts: self
                    .max_failed_attempts
                    .saturating_sub(meta.failed_attempt_count),
            },
        }
    }

    /// Lock duration after the `count`-th consecutive failure.
    ///
    /// Zero below the threshold, then `base * 2^(count - threshold)` capped
    /// at `max_backoff`.
    pub fn backoff(&self, count: u32) -> Duration {
        if count < self.max_failed_attempts {
            return Duration::ZERO;
        }
        let exponent = count - self.max_failed_attempts;
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Count one failed attempt. Returns the new lock expiry when this
    /// attempt locks the vault.
    pub fn record_failure(
        &self,
        meta: &mut VaultMetadata,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        meta.failed_attempt_count = meta.failed_attempt_count.saturating_add(1);
        if meta.failed_attempt_count < self.max_failed_attempts {
            return None;
        }
        let delta = TimeDelta::from_std(self.backoff(meta.failed_attempt_count))
            .unwrap_or(TimeDelta::MAX);
        let until = now
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        meta.locked_until = Some(until);
        Some(until)
    }

    pub fn record_success(&self, meta: &mut VaultMetadata) {
        meta.failed_attempt_count = 0;
        meta.locked_until = None;
    }
}
