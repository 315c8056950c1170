// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as KDF cost floors and coherent lockout bounds.

use crate::diagnostic::ConfigError;
use crate::model::CredvaultConfig;

/// Accepted values for `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CredvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        invalid(format!(
            "logging.level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.logging.level
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    if config.kdf.memory_cost < 32768 {
        invalid(format!(
            "kdf.memory_cost must be at least 32768 (32 MiB), got {}",
            config.kdf.memory_cost
        ));
    }

    if config.kdf.iterations < 2 {
        invalid(format!(
            "kdf.iterations must be at least 2, got {}",
            config.kdf.iterations
        ));
    }

    if config.kdf.parallelism < 1 {
        invalid(format!(
            "kdf.parallelism must be at least 1, got {}",
            config.kdf.parallelism
        ));
    }

    if config.policy.min_password_score > 100 {
        invalid(format!(
            "policy.min_password_score must be between 0 and 100, got {}",
            config.policy.min_password_score
        ));
    }

    if config.lockout.max_failed_attempts < 1 {
        invalid("lockout.max_failed_attempts must be at least 1".to_string());
    }

    if config.lockout.base_backoff_secs < 1 {
        invalid("lockout.base_backoff_secs must be at least 1".to_string());
    }

    if config.lockout.max_backoff_secs < config.lockout.base_backoff_secs {
        invalid(format!(
            "lockout.max_backoff_secs ({}) must not be below lockout.base_backoff_secs ({})",
            config.lockout.max_backoff_secs, config.lockout.base_backoff_secs
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
