// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failed writes must leave the vault entirely old or entirely new.

use credvault_core::VaultError;
use credvault_test_utils::{TestHarness, secret};
use credvault_vault::model::{META_KEY, RECORDS_KEY};
use secrecy::ExposeSecret;

const OLD: &str = "Tr0ub4dor&3xyz!";
const NEW: &str = "N3wP@ssphrase#99";

async fn populated(sqlite: bool) -> TestHarness {
    let mut builder = TestHarness::builder().with_faults();
    if sqlite {
        builder = builder.with_sqlite();
    }
    let harness = builder.build().await.unwrap();
    let vault = &harness.vault;
    vault.initialize(&secret(OLD)).await.unwrap();
    vault
        .store_secret("image-search", &secret("abc123"))
        .await
        .unwrap();
    vault
        .store_secret("ai-generation", &secret("sk-0123456789abcdefghij"))
        .await
        .unwrap();
    vault
        .store_secret("github", &secret("ghp_abcdef0123456789"))
        .await
        .unwrap();
    harness
}

async fn failed_commit_keeps_old_vault(sqlite: bool) {
    let harness = populated(sqlite).await;
    let faulty = harness.faulty.clone().unwrap();
    let before = harness.snapshot().await.unwrap();
    let batches = faulty.atomic_batches();

    faulty.fail_next_atomic();
    let err = harness
        .vault
        .rotate(&secret(OLD), &secret(NEW))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Storage { .. }));
    assert_eq!(faulty.atomic_batches(), batches);

    // Byte-for-byte unchanged.
    assert_eq!(harness.snapshot().await.unwrap(), before);

    // The session still holds the old key.
    assert!(harness.vault.is_unlocked().await);
    assert_eq!(
        harness
            .vault
            .get_secret("image-search")
            .await
            .unwrap()
            .expose_secret(),
        "abc123"
    );

    harness.vault.lock().await;
    assert!(matches!(
        harness.vault.unlock(&secret(NEW)).await,
        Err(VaultError::InvalidPassword)
    ));
    harness.vault.unlock(&secret(OLD)).await.unwrap();
    assert_eq!(
        harness
            .vault
            .get_secret("github")
            .await
            .unwrap()
            .expose_secret(),
        "ghp_abcdef0123456789"
    );
    assert_eq!(
        harness.vault.security_metrics().await.unwrap().rotation_count,
        0
    );
}

#[tokio::test]
async fn failed_commit_keeps_old_vault_in_memory() {
    failed_commit_keeps_old_vault(false).await;
}

#[tokio::test]
async fn failed_commit_keeps_old_vault_in_sqlite() {
    failed_commit_keeps_old_vault(true).await;
}

#[tokio::test]
async fn retry_after_failed_commit_succeeds() {
    let harness = populated(false).await;
    let faulty = harness.faulty.clone().unwrap();

    faulty.fail_next_atomic();
    assert!(
        harness
            .vault
            .rotate(&secret(OLD), &secret(NEW))
            .await
            .is_err()
    );

    let report = harness
        .vault
        .rotate(&secret(OLD), &secret(NEW))
        .await
        .unwrap();
    assert_eq!(report.rotation_count, 1);
    assert_eq!(report.records_rotated, 3);

    harness.vault.lock().await;
    harness.vault.unlock(&secret(NEW)).await.unwrap();
    assert_eq!(
        harness
            .vault
            .get_secret("ai-generation")
            .await
            .unwrap()
            .expose_secret(),
        "sk-0123456789abcdefghij"
    );
}

#[tokio::test]
async fn failed_store_leaves_previous_record() {
    let harness = populated(false).await;
    let faulty = harness.faulty.clone().unwrap();
    let before = harness.snapshot().await.unwrap();

    faulty.fail_next_atomic();
    let err = harness
        .vault
        .store_secret("image-search", &secret("zzz999"))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Storage { .. }));
    assert_eq!(harness.snapshot().await.unwrap(), before);
    assert_eq!(
        harness
            .vault
            .get_secret("image-search")
            .await
            .unwrap()
            .expose_secret(),
        "abc123"
    );
}

#[tokio::test]
async fn failed_initialize_leaves_nothing_behind() {
    let harness = TestHarness::builder().with_faults().build().await.unwrap();
    harness.faulty.as_ref().unwrap().fail_next_atomic();

    assert!(harness.vault.initialize(&secret(OLD)).await.is_err());
    assert!(!harness.vault.is_initialized().await.unwrap());
    assert!(!harness.vault.is_unlocked().await);
}

#[tokio::test]
async fn clear_interrupted_after_metadata_leaves_vault_uninitialized() {
    let harness = populated(false).await;
    let faulty = harness.faulty.clone().unwrap();
    faulty.fail_delete_of(RECORDS_KEY).await;

    let err = harness.vault.clear().await.unwrap_err();
    assert!(matches!(err, VaultError::Storage { .. }));
    assert!(!harness.vault.is_initialized().await.unwrap());
    assert!(!harness.vault.is_unlocked().await);

    // The stale record blob is replaced by a fresh, empty vault.
    harness.vault.initialize(&secret(NEW)).await.unwrap();
    assert!(harness.vault.list_services().await.unwrap().is_empty());
    assert!(matches!(
        harness.vault.get_secret("image-search").await,
        Err(VaultError::NotFound(_))
    ));
}

#[tokio::test]
async fn clear_failing_on_metadata_changes_nothing() {
    let harness = populated(false).await;
    let faulty = harness.faulty.clone().unwrap();
    let before = harness.snapshot().await.unwrap();
    faulty.fail_delete_of(META_KEY).await;

    assert!(harness.vault.clear().await.is_err());
    assert_eq!(harness.snapshot().await.unwrap(), before);
    assert!(harness.vault.is_initialized().await.unwrap());
    assert_eq!(
        harness
            .vault
            .get_secret("image-search")
            .await
            .unwrap()
            .expose_secret(),
        "abc123"
    );
}
