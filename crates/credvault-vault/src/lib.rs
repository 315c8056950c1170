// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted credential vault.
//!
//! A master password is stretched with Argon2id into a 32-byte key that
//! seals each service secret with AES-256-GCM. A canary record verifies the
//! key on unlock. Rotation re-encrypts the whole vault under a new password
//! and commits it with one atomic write.

pub mod context;
pub mod crypto;
pub mod events;
pub mod kdf;
pub mod lockout;
pub mod metrics;
pub mod model;
pub mod prompt;
pub mod rotation;
pub mod settings;
pub mod store;
pub mod strength;
pub mod validator;

pub use events::VaultEvent;
pub use lockout::{LockoutPolicy, LockoutState};
pub use metrics::SecurityMetrics;
pub use model::{RecordSet, VaultMetadata, VaultRecord};
pub use prompt::{
    get_new_vault_passphrase, get_vault_passphrase, get_vault_passphrase_with_confirm,
    read_secret_value,
};
pub use rotation::RotationReport;
pub use settings::VaultSettings;
pub use store::{ServiceSummary, VaultStore, mask_secret};
pub use strength::PasswordStrength;
pub use validator::{FormatVerdict, ServiceClass};
