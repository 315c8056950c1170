// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! credvault - encrypted local credential vault.
//!
//! This is the binary entry point.

mod commands;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use credvault_config::{ConfigError, CredvaultConfig};

/// credvault - encrypted local credential vault.
#[derive(Parser, Debug)]
#[command(name = "credvault", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Vault database, overriding `storage.database_path`.
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault protected by a master password.
    Init,
    /// Store or replace the secret for a service (read from prompt or stdin).
    Set { service_id: String },
    /// Print a stored secret, masked unless `--reveal` is given.
    Get {
        service_id: String,
        #[arg(long)]
        reveal: bool,
    },
    /// List stored services without decrypting them.
    List,
    /// Delete the secret for a service.
    Remove { service_id: String },
    /// Re-encrypt the vault under a new master password.
    Rotate,
    /// Permanently destroy the vault.
    Clear {
        /// Confirm the irreversible deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Show security metrics.
    Status {
        /// Output JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(cli: &Cli) -> Result<CredvaultConfig, Vec<ConfigError>> {
    let mut config = match &cli.config {
        Some(path) => credvault_config::load_and_validate_path(path)?,
        None => credvault_config::load_and_validate()?,
    };
    if let Some(database) = &cli.database {
        config.storage.database_path = database.display().to_string();
    }
    Ok(config)
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            credvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = commands::run(cli.command, &config).await {
        use colored::Colorize;
        eprintln!("{} {e}", "error:".red().bold());
        if let Some(hint) = commands::error_hint(&e) {
            eprintln!("{} {hint}", "hint:".yellow());
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "credvault",
            "get",
            "image-search",
            "--reveal",
            "--database",
            "/tmp/v.db",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/v.db")));
        assert!(matches!(
            cli.command,
            Commands::Get { ref service_id, reveal: true } if service_id == "image-search"
        ));
    }

    #[test]
    fn database_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("credvault.toml");
        std::fs::write(&config_path, "[policy]\nrotation_reminder_days = 30\n").unwrap();
        let cli = Cli::try_parse_from([
            "credvault",
            "--config",
            config_path.to_str().unwrap(),
            "--database",
            "/tmp/override.db",
            "list",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage.database_path, "/tmp/override.db");
        assert_eq!(config.policy.rotation_reminder_days, 30);
    }

    #[test]
    fn clear_requires_explicit_flag_value() {
        let cli = Cli::try_parse_from(["credvault", "clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { yes: false }));
    }
}
