// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a master password.
//!
//! Derives a 32-byte key using Argon2id (Algorithm::Argon2id, Version::V0x13).
//! The cost parameters are persisted next to the salt so unlock re-derives
//! with exactly the parameters used at creation or last rotation.

use credvault_config::model::KdfConfig;
use credvault_core::VaultError;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length of the KDF salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Supported password hashing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfAlgorithm {
    Argon2id,
}

/// Persisted KDF parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub algorithm: KdfAlgorithm,
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&KdfConfig> for KdfParams {
    fn from(config: &KdfConfig) -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            memory_cost: config.memory_cost,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

/// Derive a 32-byte key from `password` using the given parameters.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop. This call is deliberately slow; async callers should use
/// [`derive_key_offloaded`].
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let algorithm = match params.algorithm {
        KdfAlgorithm::Argon2id => argon2::Algorithm::Argon2id,
    };
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(algorithm, argon2::Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| VaultError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Run [`derive_key`] on the blocking thread pool.
///
/// The password bytes are copied into a zeroizing buffer that moves into the
/// blocking task and is wiped when the task finishes.
pub async fn derive_key_offloaded(
    password: &SecretString,
    salt: [u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let password = Zeroizing::new(password.expose_secret().as_bytes().to_vec());
    tokio::task::spawn_blocking(move || derive_key(&password, &salt, &params))
        .await
        .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))?
}

/// Generate a random 16-byte salt from the system CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| VaultError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
