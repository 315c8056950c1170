// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the credvault encrypted credential vault.
//!
//! Provides the error taxonomy shared across the workspace and the traits
//! at the vault's external boundaries: the blob storage adapter and the
//! wall clock used by lockout and rotation policy.

pub mod error;
pub mod traits;

pub use error::VaultError;
pub use traits::{BlobStore, Clock, ManualClock, SystemClock};
