// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open of individual records.
//!
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the system
//! CSPRNG. Nonce reuse under one key would break GCM confidentiality and
//! integrity, so no caller ever supplies a nonce for sealing.

use credvault_core::VaultError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::KEY_LEN;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Output of [`seal`]: ciphertext with the tag appended, plus its nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, VaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key`, authenticating `aad` alongside it.
pub fn seal(key: &[u8; KEY_LEN], aad: &[u8], plaintext: &[u8]) -> Result<Sealed, VaultError> {
    let less_safe = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Crypto("failed to generate random nonce".to_string()))?;

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| VaultError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok(Sealed {
        ciphertext: in_out,
        nonce: nonce_bytes,
    })
}

/// Decrypt `ciphertext` (tag included) sealed by [`seal`].
///
/// A wrong key, wrong associated data or any tampered byte yields
/// [`VaultError::Decryption`] labelled with `label`.
pub fn open(
    key: &[u8; KEY_LEN],
    aad: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    label: &str,
) -> Result<Vec<u8>, VaultError> {
    if ciphertext.len() < TAG_LEN {
        return Err(VaultError::Decryption(label.to_string()));
    }
    let less_safe = aead_key(key)?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = less_safe
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| VaultError::Decryption(label.to_string()))?;

    Ok(plaintext.to_vec())
}
