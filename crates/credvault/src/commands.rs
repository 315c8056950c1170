// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations over a SQLite-backed vault.

use std::sync::Arc;

use credvault_config::CredvaultConfig;
use credvault_core::VaultError;
use credvault_storage::SqliteBlobStore;
use credvault_vault::strength::{self, PasswordStrength};
use credvault_vault::{
    ServiceSummary, VaultSettings, VaultStore, get_new_vault_passphrase, get_vault_passphrase,
    get_vault_passphrase_with_confirm, mask_secret, read_secret_value,
};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::Commands;
use crate::status;

/// An open vault and the database it lives in.
struct Session {
    vault: VaultStore,
    db: Arc<SqliteBlobStore>,
}

impl Session {
    async fn open(config: &CredvaultConfig) -> Result<Self, VaultError> {
        let path = &config.storage.database_path;
        debug!(path = %path, "opening vault database");
        let db = Arc::new(SqliteBlobStore::open(path).await?);
        let vault = VaultStore::new(db.clone(), VaultSettings::from(config));
        Ok(Self { vault, db })
    }

    /// Open and unlock with the master password.
    async fn unlocked(config: &CredvaultConfig) -> Result<Self, VaultError> {
        let session = Self::open(config).await?;
        if !session.vault.is_initialized().await? {
            return Err(VaultError::NotInitialized);
        }
        let password = get_vault_passphrase()?;
        session.vault.unlock(&password).await?;
        Ok(session)
    }

    async fn close(self) -> Result<(), VaultError> {
        self.vault.lock().await;
        self.db.close().await
    }
}

/// Run one subcommand to completion.
pub async fn run(command: Commands, config: &CredvaultConfig) -> Result<(), VaultError> {
    match command {
        Commands::Init => init(config).await,
        Commands::Set { service_id } => set(config, &service_id).await,
        Commands::Get { service_id, reveal } => get(config, &service_id, reveal).await,
        Commands::List => list(config).await,
        Commands::Remove { service_id } => remove(config, &service_id).await,
        Commands::Rotate => rotate(config).await,
        Commands::Clear { yes } => clear(config, yes).await,
        Commands::Status { json, plain } => status::run_status(config, json, plain).await,
    }
}

async fn init(config: &CredvaultConfig) -> Result<(), VaultError> {
    let session = Session::open(config).await?;
    if session.vault.is_initialized().await? {
        return Err(VaultError::AlreadyInitialized);
    }

    let password = get_vault_passphrase_with_confirm("New master password")?;
    session.vault.initialize(&password).await?;
    let rating = PasswordStrength::from_score(strength::score(password.expose_secret()));

    println!(
        "Vault created at {} (password strength: {}).",
        config.storage.database_path,
        rating.description()
    );
    session.close().await
}

async fn set(config: &CredvaultConfig, service_id: &str) -> Result<(), VaultError> {
    let session = Session::unlocked(config).await?;
    let value = read_secret_value(&format!("Secret for {service_id}"))?;
    session.vault.store_secret(service_id, &value).await?;

    println!("Stored secret for {service_id}.");
    session.close().await
}

async fn get(config: &CredvaultConfig, service_id: &str, reveal: bool) -> Result<(), VaultError> {
    let session = Session::unlocked(config).await?;
    let value = session.vault.get_secret(service_id).await?;

    if reveal {
        println!("{}", value.expose_secret());
    } else {
        println!("{service_id}: {}", mask_secret(value.expose_secret()));
    }
    session.close().await
}

async fn list(config: &CredvaultConfig) -> Result<(), VaultError> {
    let session = Session::unlocked(config).await?;
    let services = session.vault.list_services().await?;

    if services.is_empty() {
        println!("No secrets stored.");
    } else {
        print!("{}", format_listing(&services));
    }
    session.close().await
}

async fn remove(config: &CredvaultConfig, service_id: &str) -> Result<(), VaultError> {
    let session = Session::unlocked(config).await?;
    session.vault.remove_secret(service_id).await?;

    println!("Removed secret for {service_id}.");
    session.close().await
}

async fn rotate(config: &CredvaultConfig) -> Result<(), VaultError> {
    let session = Session::open(config).await?;
    if !session.vault.is_initialized().await? {
        return Err(VaultError::NotInitialized);
    }

    let old_password = get_vault_passphrase()?;
    let new_password = get_new_vault_passphrase()?;
    let report = session.vault.rotate(&old_password, &new_password).await?;

    println!(
        "Master password rotated ({} secret(s) re-encrypted, rotation #{}).",
        report.records_rotated, report.rotation_count
    );
    session.close().await
}

async fn clear(config: &CredvaultConfig, yes: bool) -> Result<(), VaultError> {
    if !yes {
        return Err(VaultError::Config(
            "refusing to destroy the vault without --yes".to_string(),
        ));
    }

    let session = Session::open(config).await?;
    session.vault.clear().await?;

    println!("Vault cleared.");
    session.close().await
}

/// A next step for errors the user can fix by retrying.
pub fn error_hint(err: &VaultError) -> Option<String> {
    if !err.is_recoverable() {
        return None;
    }
    let hint = match err {
        VaultError::WeakPassword { required, .. } => {
            format!("use a longer password mixing character classes (score {required}+)")
        }
        VaultError::InvalidPassword => "check the master password and try again".to_string(),
        VaultError::Locked { until } => format!(
            "wait until {} before the next attempt",
            until.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        VaultError::NotFound(_) => "run `credvault list` to see stored services".to_string(),
        VaultError::InvalidServiceId(_) => {
            "service ids are lowercase ASCII letters, digits, `-`, `_` or `.`".to_string()
        }
        VaultError::InvalidFormat { service_id, .. } => {
            format!("re-check the value for {service_id}, it was not stored")
        }
        _ => return None,
    };
    Some(hint)
}

fn format_listing(services: &[ServiceSummary]) -> String {
    let width = services
        .iter()
        .map(|s| s.service_id.len())
        .max()
        .unwrap_or(0)
        .max("SERVICE".len());

    let mut out = format!("{:<width$}  {:<13}  VERSION\n", "SERVICE", "CLASS");
    for service in services {
        out.push_str(&format!(
            "{:<width$}  {:<13}  {}\n",
            service.service_id,
            service.class.to_string(),
            service.record_version
        ));
    }
    out
}
