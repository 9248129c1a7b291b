// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message store with snapshot fan-out.
//!
//! Each collection owns a broadcast channel. Every change publishes the full
//! collection, so a lagging subscriber can skip ahead without losing state.
//! `append` publishes the new record as `Pending` first and then again with
//! its commit stamp, the way a hosted store with latency compensation does.
//!
//! Several sessions share one backing store through [`LoopbackStore::share`].
//! Shutting a handle down ends only the feeds that handle opened; stored
//! messages are never removed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_config::BackendConfig;
use parley_core::{
    AdapterType, CollectionPath, CommitStamp, CommitTime, HealthStatus, MessageId, MessageRecord,
    NewMessage, ParleyError, PluginAdapter, Snapshot, SnapshotStream, StoreAdapter,
};

/// Snapshots buffered per subscriber before it starts lagging.
const FEED_CAPACITY: usize = 64;

struct Collection {
    messages: Vec<MessageRecord>,
    sender: broadcast::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            messages: Vec::new(),
            sender,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.messages.clone())
    }

    fn publish(&self) {
        let receivers = self.sender.send(self.snapshot()).unwrap_or(0);
        debug!(messages = self.messages.len(), receivers, "snapshot published");
    }
}

/// State shared by every handle onto one store.
struct Backing {
    collections: RwLock<HashMap<CollectionPath, Collection>>,
    last_stamp: AtomicI64,
}

/// A handle onto a process-local store.
pub struct LoopbackStore {
    name: String,
    backing: Arc<Backing>,
    commit_delay: Duration,
    /// Cancelled on shutdown; ends the feeds opened through this handle.
    feeds: Mutex<CancellationToken>,
}

impl LoopbackStore {
    pub fn new() -> Self {
        Self {
            name: "loopback-store".to_string(),
            backing: Arc::new(Backing {
                collections: RwLock::new(HashMap::new()),
                last_stamp: AtomicI64::new(i64::MIN),
            }),
            commit_delay: Duration::ZERO,
            feeds: Mutex::new(CancellationToken::new()),
        }
    }

    /// Another handle onto the same collections, with its own feeds.
    pub fn share(&self) -> Self {
        Self {
            name: self.name.clone(),
            backing: self.backing.clone(),
            commit_delay: self.commit_delay,
            feeds: Mutex::new(CancellationToken::new()),
        }
    }

    /// A store named after the configured backend project.
    pub fn for_backend(backend: &BackendConfig) -> Result<Self, ParleyError> {
        if backend.project_id.trim().is_empty() {
            return Err(ParleyError::Initialization(
                "backend project_id must not be empty".into(),
            ));
        }
        info!(project_id = %backend.project_id, "using in-process message store");
        Ok(Self {
            name: format!("loopback-store:{}", backend.project_id),
            ..Self::new()
        })
    }

    /// Holds each append in the `Pending` state for `delay` before committing it.
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = delay;
        self
    }

    /// Current contents of a collection, in insertion order.
    pub async fn messages(&self, path: &CollectionPath) -> Vec<MessageRecord> {
        self.backing
            .collections
            .read()
            .await
            .get(path)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Next commit stamp: wall-clock milliseconds, never below the previous stamp.
    fn next_stamp(&self) -> CommitStamp {
        let now = CommitStamp::now().0;
        let previous = self
            .backing
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        CommitStamp(now.max(previous.saturating_add(1)))
    }

    fn feed_token(&self) -> CancellationToken {
        self.feeds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for LoopbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for LoopbackStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        let ended = std::mem::take(
            &mut *self.feeds.lock().unwrap_or_else(PoisonError::into_inner),
        );
        ended.cancel();
        info!(store = %self.name, "loopback store handle shut down");
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for LoopbackStore {
    async fn subscribe(&self, path: &CollectionPath) -> Result<SnapshotStream, ParleyError> {
        let mut collections = self.backing.collections.write().await;
        let collection = collections.entry(path.clone()).or_insert_with(Collection::new);
        let receiver = collection.sender.subscribe();
        let initial = collection.snapshot();
        drop(collections);

        debug!(path = %path, "new subscriber");
        let path = path.clone();
        let updates = futures::stream::unfold(receiver, move |mut receiver| {
            let path = path.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(snapshot) => return Some((Ok::<_, ParleyError>(snapshot), receiver)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(path = %path, skipped, "subscriber lagged, skipping ahead");
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(futures::stream::once(async move { Ok::<_, ParleyError>(initial) })
            .chain(updates)
            .take_until(self.feed_token().cancelled_owned())
            .boxed())
    }

    async fn append(
        &self,
        path: &CollectionPath,
        message: NewMessage,
    ) -> Result<MessageId, ParleyError> {
        let id = MessageId(uuid::Uuid::new_v4().to_string());

        {
            let mut collections = self.backing.collections.write().await;
            let collection = collections.entry(path.clone()).or_insert_with(Collection::new);
            collection.messages.push(MessageRecord {
                id: id.clone(),
                text: Some(message.text),
                author_id: Some(message.author_id),
                commit_time: CommitTime::Pending,
            });
            collection.publish();
        }

        if !self.commit_delay.is_zero() {
            tokio::time::sleep(self.commit_delay).await;
        }

        let mut collections = self.backing.collections.write().await;
        let collection = collections
            .get_mut(path)
            .ok_or_else(|| ParleyError::send(format!("collection {path} was dropped before commit")))?;
        let record = collection
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ParleyError::send(format!("message {id} vanished before commit")))?;
        let stamp = self.next_stamp();
        record.commit_time = CommitTime::Committed(stamp);
        collection.publish();

        debug!(message_id = %id, stamp = stamp.0, "message committed");
        Ok(id)
    }
}
