// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./credvault.toml` > `~/.config/credvault/credvault.toml`
//! > `/etc/credvault/credvault.toml` with environment variable overrides via
//! the `CREDVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::CredvaultConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/credvault/credvault.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "credvault.toml";

/// Environment variables that share the prefix but are not config keys.
const NON_CONFIG_ENV_KEYS: &[&str] = &["passphrase", "new_passphrase"];

/// Path of the per-user configuration file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("credvault").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/credvault/credvault.toml` (system-wide)
/// 3. `~/.config/credvault/credvault.toml` (user XDG config)
/// 4. `./credvault.toml` (local directory)
/// 5. `CREDVAULT_*` environment variables
pub fn load_config() -> Result<CredvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CredvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CredvaultConfig, figment::Error> {
    debug!(path = %path.display(), "loading config from explicit path");
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CREDVAULT_KDF_MEMORY_COST` must map to `kdf.memory_cost`,
/// not `kdf.memory.cost`.
fn env_provider() -> Env {
    Env::prefixed("CREDVAULT_")
        .ignore(NON_CONFIG_ENV_KEYS)
        .map(|key| {
            // `key` keeps its original case with the prefix stripped:
            // CREDVAULT_LOCKOUT_MAX_FAILED_ATTEMPTS -> "LOCKOUT_MAX_FAILED_ATTEMPTS".
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("logging_", "logging.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("kdf_", "kdf.", 1)
                .replacen("policy_", "policy.", 1)
                .replacen("lockout_", "lockout.", 1);
            mapped.into()
        })
}
