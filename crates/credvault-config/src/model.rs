// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for credvault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level credvault configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredvaultConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the vault's blobs are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Argon2id cost parameters for new salts.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Password and rotation policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Failed-unlock lockout policy.
    #[serde(default)]
    pub lockout: LockoutConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the vault blobs.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("credvault").join("vault.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "credvault.db".to_string())
}

/// Argon2id key derivation cost parameters.
///
/// Applied when a salt is generated (initialize and rotate). Unlock always
/// uses the parameters persisted with the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub memory_cost: u32,

    /// Iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_kdf_memory_cost(),
            iterations: default_kdf_iterations(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Password strength and rotation reminder policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Minimum strength score (0-100) for initialize and rotate.
    #[serde(default = "default_min_password_score")]
    pub min_password_score: u8,

    /// Days after the last rotation before a reminder is raised.
    #[serde(default = "default_rotation_reminder_days")]
    pub rotation_reminder_days: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_password_score: default_min_password_score(),
            rotation_reminder_days: default_rotation_reminder_days(),
        }
    }
}

fn default_min_password_score() -> u8 {
    60
}

fn default_rotation_reminder_days() -> u32 {
    90
}

/// Failed-unlock lockout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockoutConfig {
    /// Consecutive failures that trigger a lockout.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// Lockout length on the attempt that reaches the threshold.
    #[serde(default = "default_base_backoff_secs")]
    pub base_backoff_secs: u64,

    /// Upper bound for the doubling backoff.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            base_backoff_secs: default_base_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_base_backoff_secs() -> u64 {
    30
}

fn default_max_backoff_secs() -> u64 {
    3600
}
