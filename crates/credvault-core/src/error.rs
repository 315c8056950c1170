// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the credvault workspace.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The primary error type returned by every vault and storage operation.
///
/// Messages never include passwords, derived keys, or secret values.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Password strength is below the configured threshold.
    #[error("password is too weak (score {score}, at least {required} required)")]
    WeakPassword { score: u8, required: u8 },

    /// The derived key failed canary or record decryption.
    #[error("invalid password")]
    InvalidPassword,

    /// Too many consecutive failed unlock attempts.
    #[error("vault is locked after repeated failed attempts until {until}")]
    Locked { until: DateTime<Utc> },

    /// Authenticated decryption of a stored record failed.
    #[error("failed to decrypt record `{0}` -- corrupted data or stale key")]
    Decryption(String),

    /// No record exists for the requested service id.
    #[error("no secret stored for service `{0}`")]
    NotFound(String),

    /// `initialize` was called on a vault that already exists.
    #[error("vault is already initialized")]
    AlreadyInitialized,

    /// The operation needs a vault and none exists yet.
    #[error("vault is not initialized")]
    NotInitialized,

    /// Record access attempted without an unlocked session.
    #[error("vault is locked -- unlock it first")]
    NotUnlocked,

    /// The service id does not satisfy the naming rules.
    #[error("invalid service id `{0}`")]
    InvalidServiceId(String),

    /// The secret was rejected by local format validation.
    #[error("secret for `{service_id}` rejected: {reason}")]
    InvalidFormat { service_id: String, reason: String },

    /// Storage adapter I/O failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Persisted bytes could not be parsed or have unexpected lengths.
    #[error("corrupted vault data: {0}")]
    Corrupted(String),

    /// RNG, key setup, or KDF parameter failure.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// Configuration or passphrase acquisition failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Whether the caller can reasonably retry with different input or later.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::WeakPassword { .. }
                | Self::InvalidPassword
                | Self::Locked { .. }
                | Self::NotFound(_)
                | Self::NotUnlocked
                | Self::InvalidServiceId(_)
                | Self::InvalidFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_are_recoverable() {
        assert!(VaultError::InvalidPassword.is_recoverable());
        assert!(
            VaultError::WeakPassword {
                score: 10,
                required: 60
            }
            .is_recoverable()
        );
        assert!(VaultError::Locked { until: Utc::now() }.is_recoverable());
        assert!(VaultError::NotFound("image-search".into()).is_recoverable());
    }

    #[test]
    fn integrity_errors_are_not_recoverable() {
        assert!(!VaultError::Decryption("image-search".into()).is_recoverable());
        assert!(!VaultError::Corrupted("bad json".into()).is_recoverable());
        assert!(!VaultError::storage("disk full").is_recoverable());
    }

    #[test]
    fn weak_password_message_names_threshold() {
        let err = VaultError::WeakPassword {
            score: 35,
            required: 60,
        };
        assert_eq!(
            err.to_string(),
            "password is too weak (score 35, at least 60 required)"
        );
    }

    #[test]
    fn storage_helper_boxes_source() {
        let err = VaultError::storage(std::io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "storage error: disk gone");
    }
}
