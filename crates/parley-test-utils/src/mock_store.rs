// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock store collaborator with a scripted snapshot feed.
//!
//! Items pushed before `subscribe()` are replayed to the next subscriber;
//! items pushed while a subscription is open go straight to it. Once
//! [`MockStore::close_feed`] is called every feed, current and future, ends
//! after its queued items.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{Notify, mpsc};

use parley_core::{
    AdapterType, CollectionPath, HealthStatus, MessageId, NewMessage, ParleyError, PluginAdapter,
    Snapshot, SnapshotStream, StoreAdapter,
};

use crate::lock;

type FeedItem = Result<Snapshot, ParleyError>;

#[derive(Default)]
struct Feed {
    queued: Vec<FeedItem>,
    live: Option<mpsc::UnboundedSender<FeedItem>>,
    closed: bool,
}

/// A mock document store.
pub struct MockStore {
    feed: Mutex<Feed>,
    appended: Mutex<Vec<(CollectionPath, NewMessage)>>,
    append_failure: Mutex<Option<String>>,
    append_gate: Mutex<Option<Arc<Notify>>>,
    health: Mutex<HealthStatus>,
    subscribe_failures: AtomicU32,
    subscribes: AtomicUsize,
    shutdowns: AtomicUsize,
    next_id: AtomicU64,
}

impl MockStore {
    /// A healthy store with an empty, open feed.
    pub fn new() -> Self {
        Self {
            feed: Mutex::new(Feed::default()),
            appended: Mutex::new(Vec::new()),
            append_failure: Mutex::new(None),
            append_gate: Mutex::new(None),
            health: Mutex::new(HealthStatus::Healthy),
            subscribe_failures: AtomicU32::new(0),
            subscribes: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers `snapshot` to the open feed, or queues it for the next one.
    pub fn push_snapshot(&self, snapshot: Snapshot) {
        self.push(Ok(snapshot));
    }

    /// Delivers a transport fault without closing the feed.
    pub fn push_error(&self, message: impl Into<String>) {
        self.push(Err(ParleyError::subscription(message)));
    }

    /// Ends the open feed and every later one.
    pub fn close_feed(&self) {
        let mut feed = lock(&self.feed);
        feed.closed = true;
        feed.live = None;
    }

    /// The next `count` calls to `subscribe()` fail.
    pub fn fail_subscribes(&self, count: u32) {
        self.subscribe_failures.store(count, Ordering::SeqCst);
    }

    /// Every later `append()` fails with `message` after being recorded.
    pub fn fail_appends(&self, message: impl Into<String>) {
        *lock(&self.append_failure) = Some(message.into());
    }

    /// Makes each `append()` wait for a permit on the returned gate.
    pub fn hold_appends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.append_gate) = Some(gate.clone());
        gate
    }

    pub fn set_health(&self, health: HealthStatus) {
        *lock(&self.health) = health;
    }

    /// Every append received, in call order, including failed ones.
    pub fn appended(&self) -> Vec<(CollectionPath, NewMessage)> {
        lock(&self.appended).clone()
    }

    pub fn append_count(&self) -> usize {
        lock(&self.appended).len()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    fn push(&self, item: FeedItem) {
        let mut feed = lock(&self.feed);
        let item = match &feed.live {
            Some(tx) => match tx.send(item) {
                Ok(()) => return,
                Err(mpsc::error::SendError(item)) => item,
            },
            None => item,
        };
        feed.live = None;
        feed.queued.push(item);
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(lock(&self.health).clone())
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.close_feed();
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for MockStore {
    async fn subscribe(&self, _path: &CollectionPath) -> Result<SnapshotStream, ParleyError> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let remaining = self.subscribe_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.subscribe_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ParleyError::subscription("mock subscribe failure"));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut feed = lock(&self.feed);
        for item in feed.queued.drain(..) {
            let _ = tx.send(item);
        }
        if !feed.closed {
            feed.live = Some(tx);
        }
        drop(feed);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }

    async fn append(
        &self,
        path: &CollectionPath,
        message: NewMessage,
    ) -> Result<MessageId, ParleyError> {
        lock(&self.appended).push((path.clone(), message));

        let gate = lock(&self.append_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(reason) = lock(&self.append_failure).clone() {
            return Err(ParleyError::send(reason));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(format!("mock-msg-{n}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Identity;

    fn path() -> CollectionPath {
        CollectionPath::for_app("mock")
    }

    #[tokio::test]
    async fn queued_items_replay_then_feed_stays_open() {
        let store = MockStore::new();
        store.push_snapshot(Snapshot::default());
        let mut feed = store.subscribe(&path()).await.unwrap();

        assert!(feed.next().await.unwrap().is_ok());

        store.push_error("boom");
        assert!(feed.next().await.unwrap().is_err());

        store.close_feed();
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn closed_store_hands_out_ended_feeds() {
        let store = MockStore::new();
        store.close_feed();
        let mut feed = store.subscribe(&path()).await.unwrap();
        assert!(feed.next().await.is_none());
        assert_eq!(store.subscribe_count(), 1);
    }

    #[tokio::test]
    async fn subscribe_failures_are_consumed() {
        let store = MockStore::new();
        store.fail_subscribes(1);
        assert!(store.subscribe(&path()).await.is_err());
        assert!(store.subscribe(&path()).await.is_ok());
    }

    #[tokio::test]
    async fn append_records_and_assigns_ids() {
        let store = MockStore::new();
        let message = NewMessage {
            text: "hi".into(),
            author_id: Identity("me".into()),
        };
        let id = store.append(&path(), message).await.unwrap();
        assert_eq!(id.0, "mock-msg-1");
        assert_eq!(store.appended()[0].1.text, "hi");
    }

    #[tokio::test]
    async fn failing_append_is_still_recorded() {
        let store = MockStore::new();
        store.fail_appends("rejected");
        let message = NewMessage {
            text: "hi".into(),
            author_id: Identity("me".into()),
        };
        assert!(store.append(&path(), message).await.is_err());
        assert_eq!(store.append_count(), 1);
    }
}
