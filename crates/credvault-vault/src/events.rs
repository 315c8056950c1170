// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory events published by the vault store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VaultEvent {
    /// The master password is older than the configured reminder interval.
    RotationReminder {
        last_rotation_at: DateTime<Utc>,
        days_since_rotation: i64,
    },
    /// Repeated failures locked the vault.
    LockedOut {
        until: DateTime<Utc>,
        failed_attempts: u32,
    },
}

/// Publish without failing when nobody is listening.
pub(crate) fn publish(sender: &broadcast::Sender<VaultEvent>, event: VaultEvent) {
    let _ = sender.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kebab_case_tag() {
        let until = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(VaultEvent::LockedOut {
            until,
            failed_attempts: 5,
        })
        .unwrap();
        assert_eq!(json["type"], "locked-out");
        assert_eq!(json["failed_attempts"], 5);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        drop(rx);
        publish(
            &tx,
            VaultEvent::RotationReminder {
                last_rotation_at: Utc::now(),
                days_since_rotation: 91,
            },
        );
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let (tx, mut rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let event = VaultEvent::LockedOut {
            until: Utc::now(),
            failed_attempts: 6,
        };
        publish(&tx, event.clone());
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
