// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline syntactic validation of service ids and secret values.
//!
//! Nothing here touches the network. A value that passes is only
//! well-formed; whether the remote service accepts it is out of scope.

use credvault_core::VaultError;
use serde::Serialize;
use strum::{Display, EnumString};

/// Maximum length of a service id.
const SERVICE_ID_MAX: usize = 64;

/// Family of third-party service a secret belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ServiceClass {
    ImageSearch,
    AiGeneration,
    Generic,
}

impl ServiceClass {
    /// Classify a service id by its prefix.
    pub fn for_service_id(service_id: &str) -> Self {
        if service_id.starts_with("image-search") {
            Self::ImageSearch
        } else if service_id.starts_with("ai-generation") {
            Self::AiGeneration
        } else {
            Self::Generic
        }
    }
}

/// Result of [`validate_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatVerdict {
    pub valid: bool,
    pub reason: Option<String>,
}

impl FormatVerdict {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn check_length(candidate: &str, min: usize, max: usize) -> Option<FormatVerdict> {
    let len = candidate.chars().count();
    if len < min || len > max {
        return Some(FormatVerdict::reject(format!(
            "length {len} outside allowed range {min}..={max}"
        )));
    }
    None
}

/// Check a candidate secret against the rules of its service class.
pub fn validate_format(class: ServiceClass, candidate: &str) -> FormatVerdict {
    if candidate.trim() != candidate {
        return FormatVerdict::reject("leading or trailing whitespace");
    }

    match class {
        ServiceClass::ImageSearch => {
            if let Some(verdict) = check_length(candidate, 6, 128) {
                return verdict;
            }
            if !candidate.chars().all(is_token_char) {
                return FormatVerdict::reject("only letters, digits, '_' and '-' are allowed");
            }
        }
        ServiceClass::AiGeneration => {
            if !candidate.starts_with("sk-") {
                return FormatVerdict::reject("missing required prefix `sk-`");
            }
            if let Some(verdict) = check_length(candidate, 20, 256) {
                return verdict;
            }
            if !candidate.chars().all(is_token_char) {
                return FormatVerdict::reject("only letters, digits, '_' and '-' are allowed");
            }
        }
        ServiceClass::Generic => {
            if let Some(verdict) = check_length(candidate, 1, 4096) {
                return verdict;
            }
            if candidate
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
            {
                return FormatVerdict::reject("whitespace and control characters are not allowed");
            }
        }
    }

    FormatVerdict::ok()
}

/// Check a service id against the naming rules.
///
/// Ids are 1 to 64 characters of lowercase ASCII letters, digits, `-`, `_`
/// and `.`, starting with a letter or digit.
pub fn validate_service_id(service_id: &str) -> Result<(), VaultError> {
    let invalid = || VaultError::InvalidServiceId(service_id.to_string());

    let first = service_id.chars().next().ok_or_else(invalid)?;
    if service_id.len() > SERVICE_ID_MAX {
        return Err(invalid());
    }
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return Err(invalid());
    }
    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.'
    };
    if !service_id.chars().all(allowed) {
        return Err(invalid());
    }
    Ok(())
}
