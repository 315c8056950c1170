// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key material of an unlocked vault.

use credvault_core::VaultError;
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, KEY_LEN, KdfParams, SALT_LEN};
use crate::model::{
    CANARY_ID, CANARY_PLAINTEXT, VaultMetadata, VaultRecord, canary_aad, record_aad,
};

/// Derived key plus the salt and parameters it came from.
///
/// Never serialized. The key is wiped when the context is dropped.
pub struct MasterKeyContext {
    key: Zeroizing<[u8; KEY_LEN]>,
    salt: [u8; SALT_LEN],
    params: KdfParams,
}

impl std::fmt::Debug for MasterKeyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeyContext")
            .field("key", &"[REDACTED]")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl MasterKeyContext {
    /// Derive the key for `password` on the blocking pool.
    pub async fn derive(
        password: &SecretString,
        salt: [u8; SALT_LEN],
        params: KdfParams,
    ) -> Result<Self, VaultError> {
        let key = kdf::derive_key_offloaded(password, salt, params).await?;
        Ok(Self { key, salt, params })
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    pub fn seal_canary(&self) -> Result<VaultRecord, VaultError> {
        let sealed = crypto::seal(&self.key, &canary_aad(), CANARY_PLAINTEXT)?;
        Ok(VaultRecord {
            service_id: CANARY_ID.to_string(),
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce.to_vec(),
            record_version: 1,
        })
    }

    /// Check the metadata canary. `Decryption` means the key is wrong.
    pub fn verify_canary(&self, meta: &VaultMetadata) -> Result<(), VaultError> {
        let nonce = meta.canary.nonce_array()?;
        let plaintext = Zeroizing::new(crypto::open(
            &self.key,
            &canary_aad(),
            &nonce,
            &meta.canary.ciphertext,
            CANARY_ID,
        )?);
        if plaintext.as_slice() != CANARY_PLAINTEXT {
            return Err(VaultError::Corrupted("canary plaintext mismatch".to_string()));
        }
        Ok(())
    }

    pub fn seal_record(
        &self,
        service_id: &str,
        plaintext: &[u8],
        record_version: u32,
    ) -> Result<VaultRecord, VaultError> {
        let sealed = crypto::seal(&self.key, &record_aad(service_id), plaintext)?;
        Ok(VaultRecord {
            service_id: service_id.to_string(),
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce.to_vec(),
            record_version,
        })
    }

    pub fn open_record(&self, record: &VaultRecord) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let nonce = record.nonce_array()?;
        let plaintext = crypto::open(
            &self.key,
            &record_aad(&record.service_id),
            &nonce,
            &record.ciphertext,
            &record.service_id,
        )?;
        Ok(Zeroizing::new(plaintext))
    }
}
