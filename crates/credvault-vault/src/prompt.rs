// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the CREDVAULT_PASSPHRASE environment variable.

use std::io::{BufRead, IsTerminal};

use credvault_core::VaultError;
use secrecy::SecretString;
use zeroize::Zeroizing;

/// The environment variable name for providing the master password.
pub const PASSPHRASE_ENV_VAR: &str = "CREDVAULT_PASSPHRASE";

/// The environment variable name for providing the replacement password on rotation.
pub const NEW_PASSPHRASE_ENV_VAR: &str = "CREDVAULT_NEW_PASSPHRASE";

fn no_passphrase(env_var: &str) -> VaultError {
    VaultError::Config(format!(
        "No passphrase provided. Set {env_var} environment variable or run interactively."
    ))
}

fn passphrase_from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn read_hidden(prompt: &str) -> Result<Zeroizing<String>, VaultError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map(Zeroizing::new)
        .map_err(|e| VaultError::Config(format!("failed to read passphrase: {e}")))
}

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `CREDVAULT_PASSPHRASE` environment variable (for scripts and CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_vault_passphrase() -> Result<SecretString, VaultError> {
    if let Some(passphrase) = passphrase_from_env(PASSPHRASE_ENV_VAR) {
        return Ok(passphrase);
    }

    if std::io::stdin().is_terminal() {
        let passphrase = read_hidden("Master password: ")?;
        if passphrase.is_empty() {
            return Err(VaultError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase.as_str()));
    }

    Err(no_passphrase(PASSPHRASE_ENV_VAR))
}

/// Get a new master password, prompting twice (for creation and rotation).
///
/// `label` names what the password is for, e.g. "New master password".
pub fn get_vault_passphrase_with_confirm(label: &str) -> Result<SecretString, VaultError> {
    confirmed_passphrase(PASSPHRASE_ENV_VAR, label)
}

/// Get the replacement password for rotation.
///
/// Reads `CREDVAULT_NEW_PASSPHRASE` so scripted rotation can supply both the
/// current and the new password; otherwise prompts twice.
pub fn get_new_vault_passphrase() -> Result<SecretString, VaultError> {
    confirmed_passphrase(NEW_PASSPHRASE_ENV_VAR, "New master password")
}

fn confirmed_passphrase(env_var: &str, label: &str) -> Result<SecretString, VaultError> {
    // Env var does not need confirmation.
    if let Some(passphrase) = passphrase_from_env(env_var) {
        return Ok(passphrase);
    }

    if std::io::stdin().is_terminal() {
        let first = read_hidden(&format!("{label}: "))?;
        let second = read_hidden(&format!("Confirm {}: ", label.to_lowercase()))?;

        if first.as_str() != second.as_str() {
            return Err(VaultError::Config("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(VaultError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first.as_str()));
    }

    Err(no_passphrase(env_var))
}

/// Read a secret value to store.
///
/// Prompts without echo on a terminal; otherwise reads one line from stdin
/// so values can be piped in.
pub fn read_secret_value(label: &str) -> Result<SecretString, VaultError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let value = read_hidden(&format!("{label}: "))?;
        return non_empty(&value);
    }
    read_secret_line(&mut stdin.lock())
}

fn read_secret_line(reader: &mut impl BufRead) -> Result<SecretString, VaultError> {
    let mut line = Zeroizing::new(String::new());
    reader
        .read_line(&mut line)
        .map_err(|e| VaultError::Config(format!("failed to read secret from stdin: {e}")))?;
    let value = line.trim_end_matches(['\n', '\r']);
    non_empty(value)
}

fn non_empty(value: &str) -> Result<SecretString, VaultError> {
    if value.is_empty() {
        return Err(VaultError::Config("empty secret not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}
