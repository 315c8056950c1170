// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credvault status` command implementation.
//!
//! Prints the security metrics projected from vault metadata. Needs no
//! password: metadata is not secret.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use credvault_config::CredvaultConfig;
use credvault_core::VaultError;
use credvault_storage::SqliteBlobStore;
use credvault_vault::{SecurityMetrics, VaultSettings, VaultStore};
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub initialized: bool,
    pub database_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SecurityMetrics>,
}

/// Format a timestamp for humans.
fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Run the `credvault status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &CredvaultConfig,
    json: bool,
    plain: bool,
) -> Result<(), VaultError> {
    let db = Arc::new(SqliteBlobStore::open(&config.storage.database_path).await?);
    let vault = VaultStore::new(db.clone(), VaultSettings::from(config));

    let metrics = if vault.is_initialized().await? {
        Some(vault.security_metrics().await?)
    } else {
        None
    };
    db.close().await?;

    let response = StatusResponse {
        initialized: metrics.is_some(),
        database_path: config.storage.database_path.clone(),
        metrics,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_status(&response, use_color));
    }
    Ok(())
}

fn render_status(response: &StatusResponse, use_color: bool) -> String {
    use colored::Colorize;

    let mut out = String::new();
    out.push('\n');
    out.push_str("  credvault status\n");
    out.push_str(&format!("  {}\n", "-".repeat(35)));
    out.push_str(&format!("    Database: {}\n", response.database_path));

    let Some(m) = &response.metrics else {
        out.push_str("    Vault:    not initialized\n\n");
        out.push_str("  Create one with: credvault init\n\n");
        return out;
    };

    let lock_state = match m.locked_until {
        Some(until) if m.is_locked => {
            let text = format!("locked until {}", format_time(until));
            if use_color {
                text.red().to_string()
            } else {
                format!("[LOCKED] {text}")
            }
        }
        _ if use_color => "accepting unlocks".green().to_string(),
        _ => "[OK] accepting unlocks".to_string(),
    };

    out.push_str(&format!("    State:    {lock_state}\n"));
    out.push_str(&format!("    Secrets:  {}\n", m.record_count));
    out.push_str(&format!("    Created:  {}\n", format_time(m.created_at)));
    out.push_str(&format!(
        "    Rotated:  {} ({} day(s) ago, {} rotation(s))\n",
        format_time(m.last_rotation_at),
        m.days_since_rotation,
        m.rotation_count
    ));
    out.push_str(&format!("    Accessed: {}\n", format_time(m.last_access_at)));
    out.push_str(&format!("    Failures: {}\n", m.failed_attempt_count));

    if m.rotation_due {
        let hint = "Rotation recommended: credvault rotate";
        if use_color {
            out.push_str(&format!("\n  {}\n", hint.yellow()));
        } else {
            out.push_str(&format!("\n  [WARN] {hint}\n"));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn metrics(now: DateTime<Utc>) -> SecurityMetrics {
        SecurityMetrics {
            created_at: now,
            rotation_count: 1,
            last_rotation_at: now,
            last_access_at: now,
            failed_attempt_count: 0,
            locked_until: None,
            is_locked: false,
            record_count: 2,
            days_since_rotation: 0,
            rotation_due: false,
        }
    }

    #[test]
    fn uninitialized_status_suggests_init() {
        let response = StatusResponse {
            initialized: false,
            database_path: "/tmp/vault.db".into(),
            metrics: None,
        };
        let text = render_status(&response, false);
        assert!(text.contains("not initialized"));
        assert!(text.contains("credvault init"));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"initialized\":false"));
        assert!(!json.contains("metrics"));
    }

    #[test]
    fn locked_and_due_vault_is_flagged() {
        let now = Utc::now();
        let mut m = metrics(now);
        m.is_locked = true;
        m.locked_until = Some(now + TimeDelta::minutes(1));
        m.rotation_due = true;
        let response = StatusResponse {
            initialized: true,
            database_path: "/tmp/vault.db".into(),
            metrics: Some(m),
        };

        let text = render_status(&response, false);
        assert!(text.contains("[LOCKED] locked until"));
        assert!(text.contains("[WARN] Rotation recommended"));
        assert!(text.contains("Secrets:  2"));
    }

    #[test]
    fn healthy_vault_has_no_warning() {
        let response = StatusResponse {
            initialized: true,
            database_path: "/tmp/vault.db".into(),
            metrics: Some(metrics(Utc::now())),
        };
        let text = render_status(&response, false);
        assert!(text.contains("[OK] accepting unlocks"));
        assert!(!text.contains("[WARN]"));
    }

    #[tokio::test]
    async fn status_on_fresh_database_reports_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CredvaultConfig::default();
        config.storage.database_path = dir.path().join("vault.db").display().to_string();
        run_status(&config, true, true).await.unwrap();
    }
}
