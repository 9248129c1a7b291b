// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the collaborators a chat session talks to.

pub mod adapter;
pub mod identity;
pub mod presentation;
pub mod store;

pub use adapter::PluginAdapter;
pub use identity::{IdentityAdapter, IdentityStream};
pub use presentation::PresentationAdapter;
pub use store::{SnapshotStream, StoreAdapter};
