// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single live subscription to the message collection.
//!
//! Each push is a complete snapshot. The manager publishes it into a
//! latest-value channel and forgets the previous one; a consumer that falls
//! behind only ever sees the newest snapshot.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parley_config::SyncConfig;
use parley_core::{CollectionPath, ParleyError, Snapshot, SnapshotStream, StoreAdapter};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::identity::IdentityHandle;

/// How the manager reacts when the feed closes or cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResubscribePolicy {
    /// Zero means the first closed feed ends the subscription.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl ResubscribePolicy {
    /// Never resubscribe. Reconnection is left to the store transport.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_attempts: config.resubscribe_max_attempts,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Delay before the `attempt`-th resubscribe (1-based), doubling up to the cap.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

impl Default for ResubscribePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Counters collected over the lifetime of one subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionReport {
    pub snapshots: u64,
    pub failures: u64,
    pub resubscribes: u32,
}

/// Owns the live subscription and publishes each snapshot it receives.
pub struct SubscriptionManager {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    path: CollectionPath,
    policy: ResubscribePolicy,
    latest: watch::Sender<Option<Arc<Snapshot>>>,
}

impl SubscriptionManager {
    /// Fails with [`ParleyError::NotReady`] unless the identity is resolved.
    pub fn new(
        store: Arc<dyn StoreAdapter + Send + Sync>,
        path: CollectionPath,
        identity: &IdentityHandle,
        policy: ResubscribePolicy,
    ) -> Result<Self, ParleyError> {
        if !identity.is_resolved() {
            return Err(ParleyError::NotReady(format!(
                "cannot subscribe to {path} while identity is {}",
                identity.state()
            )));
        }
        let (latest, _) = watch::channel(None);
        Ok(Self {
            store,
            path,
            policy,
            latest,
        })
    }

    /// Receiver for the most recent snapshot. `None` until the first push.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.latest.subscribe()
    }

    /// Consumes the feed until it closes for good or `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> SubscriptionReport {
        let mut report = SubscriptionReport::default();
        let mut attempt = 0u32;

        loop {
            match self.store.subscribe(&self.path).await {
                Ok(stream) => {
                    info!(path = %self.path, "subscribed to message collection");
                    let received = report.snapshots;
                    if self.drain(stream, &mut report, &cancel).await {
                        debug!("subscription cancelled");
                        return report;
                    }
                    if report.snapshots > received {
                        attempt = 0;
                    }
                    warn!(path = %self.path, "message feed closed");
                }
                Err(e) => {
                    report.failures += 1;
                    warn!(error = %e, path = %self.path, "failed to open message feed");
                }
            }

            if attempt >= self.policy.max_attempts {
                if self.policy.max_attempts > 0 {
                    warn!(attempts = attempt, "giving up on message feed");
                }
                return report;
            }
            attempt += 1;
            let delay = self.policy.delay_for(attempt);
            info!(
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "resubscribing to message feed"
            );

            tokio::select! {
                _ = cancel.cancelled() => return report,
                _ = tokio::time::sleep(delay) => {}
            }
            report.resubscribes += 1;
        }
    }

    /// Forwards snapshots until the stream ends. Returns `true` if cancelled.
    async fn drain(
        &self,
        mut stream: SnapshotStream,
        report: &mut SubscriptionReport,
        cancel: &CancellationToken,
    ) -> bool {
        loop {
            let item = tokio::select! {
                _ = cancel.cancelled() => return true,
                item = stream.next() => item,
            };
            match item {
                Some(Ok(snapshot)) => {
                    report.snapshots += 1;
                    debug!(messages = snapshot.len(), "snapshot received");
                    self.latest.send_replace(Some(Arc::new(snapshot)));
                }
                Some(Err(e)) => {
                    report.failures += 1;
                    warn!(error = %e, path = %self.path, "subscription error");
                }
                None => return false,
            }
        }
    }
}
