// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for credvault integration tests.
//!
//! # Components
//!
//! - [`FaultyStore`] - `BlobStore` wrapper that fails writes on demand
//! - [`TestHarness`] - vault over in-memory or temp SQLite storage with a manual clock

pub mod faulty_store;
pub mod harness;

pub use faulty_store::FaultyStore;
pub use harness::{TestHarness, TestHarnessBuilder, secret, test_settings};
