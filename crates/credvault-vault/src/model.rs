// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted vault layout.
//!
//! Two blobs make up a vault: [`META_KEY`] holds [`VaultMetadata`] and
//! [`RECORDS_KEY`] holds the [`RecordSet`]. Both are JSON with binary fields
//! encoded as standard base64.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use credvault_core::VaultError;
use serde::{Deserialize, Serialize};

use crate::kdf::{KdfParams, SALT_LEN};

/// Blob key of the vault metadata.
pub const META_KEY: &str = "vault/meta";

/// Blob key of the encrypted record set.
pub const RECORDS_KEY: &str = "vault/records";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Known plaintext sealed into the canary record.
pub(crate) const CANARY_PLAINTEXT: &[u8] = b"credvault-canary-v1";

/// Service id under which the canary is sealed.
pub(crate) const CANARY_ID: &str = "canary";

/// Associated data binding a sealed record to its service id.
pub(crate) fn record_aad(service_id: &str) -> Vec<u8> {
    format!("credvault:record:{service_id}").into_bytes()
}

/// Associated data of the canary record.
pub(crate) fn canary_aad() -> Vec<u8> {
    b"credvault:canary".to_vec()
}

mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// One encrypted secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    pub service_id: String,
    /// AES-256-GCM output with the 16-byte tag appended.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    pub record_version: u32,
}

impl VaultRecord {
    /// Nonce as a fixed-size array, or `Corrupted` on a wrong length.
    pub fn nonce_array(&self) -> Result<[u8; 12], VaultError> {
        self.nonce.as_slice().try_into().map_err(|_| {
            VaultError::Corrupted(format!(
                "record `{}` nonce has {} bytes, expected 12",
                self.service_id,
                self.nonce.len()
            ))
        })
    }
}

/// Non-secret vault metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMetadata {
    pub format_version: u32,
    #[serde(with = "b64")]
    pub kdf_salt: Vec<u8>,
    pub kdf_params: KdfParams,
    pub canary: VaultRecord,
    pub created_at: DateTime<Utc>,
    pub rotation_count: u32,
    pub last_rotation_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub failed_attempt_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl VaultMetadata {
    /// Salt as a fixed-size array, or `Corrupted` on a wrong length.
    pub fn salt_array(&self) -> Result<[u8; SALT_LEN], VaultError> {
        self.kdf_salt.as_slice().try_into().map_err(|_| {
            VaultError::Corrupted(format!(
                "KDF salt has {} bytes, expected {SALT_LEN}",
                self.kdf_salt.len()
            ))
        })
    }

    /// Serialize to the persisted JSON form.
    pub fn encode(&self) -> Result<Vec<u8>, VaultError> {
        serde_json::to_vec(self)
            .map_err(|e| VaultError::Internal(format!("failed to encode metadata: {e}")))
    }

    /// Parse persisted bytes, checking the format version.
    pub fn decode(bytes: &[u8]) -> Result<Self, VaultError> {
        let meta: Self = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::Corrupted(format!("unreadable metadata: {e}")))?;
        check_version("metadata", meta.format_version)?;
        Ok(meta)
    }
}

/// All encrypted records, keyed and ordered by service id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub format_version: u32,
    pub records: BTreeMap<String, VaultRecord>,
}

impl RecordSet {
    pub fn empty() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            records: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>, VaultError> {
        serde_json::to_vec(self)
            .map_err(|e| VaultError::Internal(format!("failed to encode records: {e}")))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, VaultError> {
        let set: Self = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::Corrupted(format!("unreadable record set: {e}")))?;
        check_version("record set", set.format_version)?;
        if let Some((key, record)) = set.records.iter().find(|(k, r)| **k != r.service_id) {
            return Err(VaultError::Corrupted(format!(
                "record keyed `{key}` claims service id `{}`",
                record.service_id
            )));
        }
        Ok(set)
    }
}

fn check_version(what: &str, version: u32) -> Result<(), VaultError> {
    if version != FORMAT_VERSION {
        return Err(VaultError::Corrupted(format!(
            "unsupported {what} format version {version}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::KdfAlgorithm;

    fn sample_record(id: &str) -> VaultRecord {
        VaultRecord {
            service_id: id.to_string(),
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
            nonce: vec![7u8; 12],
            record_version: 1,
        }
    }

    fn sample_meta() -> VaultMetadata {
        let now = Utc::now();
        VaultMetadata {
            format_version: FORMAT_VERSION,
            kdf_salt: vec![9u8; SALT_LEN],
            kdf_params: KdfParams {
                algorithm: KdfAlgorithm::Argon2id,
                memory_cost: 65536,
                iterations: 3,
                parallelism: 4,
            },
            canary: sample_record(CANARY_ID),
            created_at: now,
            rotation_count: 0,
            last_rotation_at: now,
            last_access_at: now,
            failed_attempt_count: 0,
            locked_until: None,
        }
    }

    #[test]
    fn binary_fields_are_base64_strings() {
        let json = serde_json::to_string(&sample_record("image-search")).unwrap();
        assert!(json.contains("\"ciphertext\":\"3q2+7w==\""));
        assert!(json.contains("\"nonce\":\"BwcHBwcHBwcHBwcH\""));
    }

    #[test]
    fn metadata_decodes_what_it_encodes() {
        let meta = sample_meta();
        let decoded = VaultMetadata::decode(&meta.encode().unwrap()).unwrap();
        assert_eq!(decoded, meta);
        assert_eq!(decoded.salt_array().unwrap(), [9u8; SALT_LEN]);
    }

    #[test]
    fn garbage_metadata_is_corrupted() {
        let err = VaultMetadata::decode(b"{not json").unwrap_err();
        assert!(matches!(err, VaultError::Corrupted(_)));
    }

    #[test]
    fn future_format_version_is_rejected() {
        let mut meta = sample_meta();
        meta.format_version = 99;
        let bytes = serde_json::to_vec(&meta).unwrap();
        let err = VaultMetadata::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("format version 99"));
    }

    #[test]
    fn short_salt_is_corrupted() {
        let mut meta = sample_meta();
        meta.kdf_salt = vec![1, 2, 3];
        assert!(matches!(meta.salt_array(), Err(VaultError::Corrupted(_))));
    }

    #[test]
    fn short_nonce_is_corrupted() {
        let mut record = sample_record("x");
        record.nonce.truncate(8);
        assert!(matches!(record.nonce_array(), Err(VaultError::Corrupted(_))));
    }

    #[test]
    fn record_set_is_ordered_by_service_id() {
        let mut set = RecordSet::empty();
        for id in ["zeta", "alpha", "mid"] {
            set.records.insert(id.to_string(), sample_record(id));
        }
        let ids: Vec<_> = set.records.keys().cloned().collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
        assert_eq!(RecordSet::decode(&set.encode().unwrap()).unwrap(), set);
    }

    #[test]
    fn mismatched_record_key_is_corrupted() {
        let mut set = RecordSet::empty();
        set.records
            .insert("image-search".to_string(), sample_record("ai-generation"));
        let err = RecordSet::decode(&set.encode().unwrap()).unwrap_err();
        assert!(matches!(err, VaultError::Corrupted(_)));
    }
}
