// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store adapter trait for the managed, push-capable document store.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CollectionPath, MessageId, NewMessage, Snapshot};

/// Live feed of full collection snapshots.
///
/// An `Err` item reports a transport fault while the feed stays open.
/// The end of the stream means the feed has closed for good.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot, ParleyError>> + Send>>;

/// Adapter for the remote message collection.
///
/// The store owns message identity and commit ordering: it assigns ids on
/// append and stamps each write with an authoritative commit value
/// asynchronously, independent of when `append` calls complete.
#[async_trait]
pub trait StoreAdapter: PluginAdapter {
    /// Opens a live, unfiltered subscription to the whole collection.
    ///
    /// Every item is a complete snapshot, never a delta.
    async fn subscribe(&self, path: &CollectionPath) -> Result<SnapshotStream, ParleyError>;

    /// Appends a message and resolves once the store acknowledges the write.
    async fn append(
        &self,
        path: &CollectionPath,
        message: NewMessage,
    ) -> Result<MessageId, ParleyError>;
}
