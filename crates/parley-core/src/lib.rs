// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat client.
//!
//! This crate provides the message model, the error taxonomy, and the
//! narrow collaborator traits through which the sync pipeline talks to the
//! remote store, the identity service, and the presentation layer.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{
    AdapterType, CollectionPath, CommitStamp, CommitTime, ContinuationToken, HealthStatus,
    Identity, MessageId, MessageRecord, NewMessage, Origin, PendingPlacement, RenderedEntry,
    Snapshot, SubmitEvent, ViewState,
};

pub use traits::{
    IdentityAdapter, IdentityStream, PluginAdapter, PresentationAdapter, SnapshotStream,
    StoreAdapter,
};
