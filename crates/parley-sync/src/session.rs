// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit session context wiring the pipeline together.
//!
//! A [`ChatSession`] is built once at startup from the configuration and the
//! three collaborators. [`ChatSession::run`] walks the startup sequence
//! (health check, identity bootstrap, label) and then drives three loops in
//! the calling task:
//!
//! - subscription: store feed -> latest-snapshot channel
//! - render: latest snapshot -> ordering -> full rebuild of the list
//! - submit: presentation submit events -> send path
//!
//! The session ends when the presentation unmounts or the cancellation
//! token fires. Collaborators are shut down on every exit path.

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_core::{
    CollectionPath, ContinuationToken, HealthStatus, Identity, IdentityAdapter, ParleyError,
    PendingPlacement, PresentationAdapter, StoreAdapter,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::identity::{IdentityBootstrap, IdentityHandle};
use crate::ordering::OrderingReconciler;
use crate::render::RenderSync;
use crate::send::{SendOutcome, SendPath};
use crate::subscription::{ResubscribePolicy, SubscriptionManager, SubscriptionReport};

/// Status shown while the identity is being resolved.
pub const CONNECTING_STATUS: &str = "Connecting...";

/// Status shown when the store is unreachable at startup.
pub const CONNECT_ERROR_STATUS: &str = "Error: Could not connect to chat service.";

/// Status shown when identity resolution fails.
pub const AUTH_FAILED_STATUS: &str = "Authentication failed.";

/// Number of identity characters shown in the identity label.
const IDENTITY_LABEL_CHARS: usize = 8;

/// The label shown once the session identity is known.
pub fn identity_label(identity: &Identity) -> String {
    format!("ID: {}...", identity.short(IDENTITY_LABEL_CHARS))
}

/// What happened during one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// `None` if the session was cancelled before the identity resolved.
    pub identity: Option<Identity>,
    pub subscription: SubscriptionReport,
    pub renders: u64,
    pub sent: u64,
    pub skipped: u64,
    pub send_failures: u64,
}

/// One chat session over a store, an identity service, and a presentation.
pub struct ChatSession {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    identity: Arc<dyn IdentityAdapter + Send + Sync>,
    presentation: Arc<dyn PresentationAdapter + Send + Sync>,
    path: CollectionPath,
    token: Option<ContinuationToken>,
    placement: PendingPlacement,
    policy: ResubscribePolicy,
}

impl ChatSession {
    pub fn new(
        config: &ParleyConfig,
        store: Arc<dyn StoreAdapter + Send + Sync>,
        identity: Arc<dyn IdentityAdapter + Send + Sync>,
        presentation: Arc<dyn PresentationAdapter + Send + Sync>,
    ) -> Self {
        Self {
            store,
            identity,
            presentation,
            path: config.collection_path(),
            token: config.identity.token(),
            placement: config.sync.pending_placement,
            policy: ResubscribePolicy::from_config(&config.sync),
        }
    }

    /// The collection this session reads from and appends to.
    pub fn collection_path(&self) -> &CollectionPath {
        &self.path
    }

    /// Runs the session until the presentation unmounts or `cancel` fires.
    ///
    /// Returns [`ParleyError::Initialization`] if the store is unreachable and
    /// [`ParleyError::Authentication`] if no identity could be resolved. In
    /// both cases the failure is also shown as status text.
    pub async fn run(&self, cancel: CancellationToken) -> Result<SessionReport, ParleyError> {
        let result = self.drive(&cancel).await;
        self.shutdown_collaborators().await;
        result
    }

    async fn drive(&self, cancel: &CancellationToken) -> Result<SessionReport, ParleyError> {
        self.check_store().await?;

        self.presentation.set_status(Some(CONNECTING_STATUS));
        let (bootstrap, handle) = IdentityBootstrap::new(self.identity.clone(), self.token.clone());

        let resolved = tokio::select! {
            _ = cancel.cancelled() => {
                info!("session cancelled during identity resolution");
                return Ok(SessionReport::default());
            }
            resolved = bootstrap.resolve() => resolved,
        };
        let identity = match resolved {
            Ok(identity) => identity,
            Err(e) => {
                self.presentation.set_status(Some(AUTH_FAILED_STATUS));
                return Err(e);
            }
        };

        self.presentation.set_identity_label(&identity_label(&identity));
        self.presentation.set_status(None);
        info!(path = %self.path, "chat session ready");

        let mut report = self.run_loops(&identity, handle, cancel).await?;
        report.identity = Some(identity);
        Ok(report)
    }

    async fn check_store(&self) -> Result<(), ParleyError> {
        let reason = match self.store.health_check().await {
            Ok(HealthStatus::Healthy) => return Ok(()),
            Ok(HealthStatus::Degraded(reason)) => {
                warn!(reason = %reason, "store reports degraded health, continuing");
                return Ok(());
            }
            Ok(HealthStatus::Unhealthy(reason)) => reason,
            Err(e) => e.to_string(),
        };
        error!(reason = %reason, "chat service unavailable");
        self.presentation.set_status(Some(CONNECT_ERROR_STATUS));
        Err(ParleyError::Initialization(reason))
    }

    async fn run_loops(
        &self,
        identity: &Identity,
        handle: IdentityHandle,
        cancel: &CancellationToken,
    ) -> Result<SessionReport, ParleyError> {
        let manager =
            SubscriptionManager::new(self.store.clone(), self.path.clone(), &handle, self.policy)?;
        let mut snapshots = manager.snapshots();
        let stop = cancel.child_token();

        let subscription = manager.run(stop.clone());

        let render = async {
            let reconciler = OrderingReconciler::new(self.placement);
            let render = RenderSync::new(self.presentation.clone());
            let mut renders = 0u64;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            debug!("snapshot channel closed, keeping last rendered view");
                            break;
                        }
                        let latest = snapshots.borrow_and_update().clone();
                        if let Some(snapshot) = latest {
                            let ordered = reconciler.order(&snapshot);
                            let view = render.sync(&ordered, identity);
                            renders += 1;
                            debug!(entries = view.entries.len(), "view rebuilt");
                        }
                    }
                }
            }
            renders
        };

        let submit = async {
            let send = SendPath::new(
                self.store.clone(),
                self.path.clone(),
                handle.clone(),
                self.presentation.clone(),
            );
            let mut tally = (0u64, 0u64, 0u64);
            loop {
                let event = tokio::select! {
                    _ = stop.cancelled() => break,
                    event = self.presentation.next_submit() => event,
                };
                if event.is_none() {
                    info!("presentation unmounted, ending session");
                    break;
                }
                match send.submit().await {
                    SendOutcome::Sent(_) => tally.0 += 1,
                    SendOutcome::Skipped(_) => tally.1 += 1,
                    SendOutcome::Failed(_) => tally.2 += 1,
                }
            }
            stop.cancel();
            tally
        };

        let (subscription, renders, (sent, skipped, send_failures)) =
            tokio::join!(subscription, render, submit);

        info!(
            snapshots = subscription.snapshots,
            failures = subscription.failures,
            sent,
            "chat session finished"
        );

        Ok(SessionReport {
            identity: None,
            subscription,
            renders,
            sent,
            skipped,
            send_failures,
        })
    }

    async fn shutdown_collaborators(&self) {
        if let Err(e) = self.store.shutdown().await {
            warn!(adapter = self.store.name(), error = %e, "shutdown failed");
        }
        if let Err(e) = self.identity.shutdown().await {
            warn!(adapter = self.identity.name(), error = %e, "shutdown failed");
        }
        if let Err(e) = self.presentation.shutdown().await {
            warn!(adapter = self.presentation.name(), error = %e, "shutdown failed");
        }
        debug!("collaborators shut down");
    }
}
