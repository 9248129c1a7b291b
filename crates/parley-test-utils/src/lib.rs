// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley.
//!
//! Mock collaborators and a session harness for fast, deterministic tests
//! without a real store, identity service, or terminal.
//!
//! # Components
//!
//! - [`MockStore`] - scripted snapshot feed, captured appends, injectable failures
//! - [`MockIdentity`] - scripted identity feed, records which sign-in path ran
//! - [`MockPresentation`] - records the rendered list, status, and label
//! - [`TestHarness`] - a [`ChatSession`](parley_sync::ChatSession) over the mocks

pub mod harness;
pub mod mock_identity;
pub mod mock_presentation;
pub mod mock_store;

pub use harness::{RunningSession, TestHarness, TestHarnessBuilder};
pub use mock_identity::MockIdentity;
pub use mock_presentation::MockPresentation;
pub use mock_store::MockStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mock's state, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
