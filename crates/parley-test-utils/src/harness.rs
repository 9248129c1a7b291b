// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session tests.
//!
//! `TestHarness` assembles a [`ChatSession`] over a [`MockStore`], a
//! [`MockIdentity`], and a [`MockPresentation`]. Tests script the mocks,
//! start the session on a background task, and assert on what the
//! presentation recorded.

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_core::{ParleyError, PendingPlacement};
use parley_sync::{ChatSession, SessionReport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::mock_identity::MockIdentity;
use crate::mock_presentation::MockPresentation;
use crate::mock_store::MockStore;

/// Builder for configurable test sessions.
pub struct TestHarnessBuilder {
    config: ParleyConfig,
    store: Option<Arc<MockStore>>,
    identity: Option<MockIdentity>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
            store: None,
            identity: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: ParleyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.app.id = app_id.into();
        self
    }

    pub fn with_placement(mut self, placement: PendingPlacement) -> Self {
        self.config.sync.pending_placement = placement;
        self
    }

    /// Configure a continuation token for identity resumption.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.identity.continuation_token = Some(token.into());
        self
    }

    /// Use a pre-scripted store instead of a fresh one.
    pub fn with_store(mut self, store: Arc<MockStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a pre-scripted identity service. Defaults to [`MockIdentity::signed_out`].
    pub fn with_identity(mut self, identity: MockIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn build(self) -> TestHarness {
        let store = self.store.unwrap_or_default();
        let identity = Arc::new(self.identity.unwrap_or_else(MockIdentity::signed_out));
        let presentation = Arc::new(MockPresentation::new());

        let session = Arc::new(ChatSession::new(
            &self.config,
            store.clone(),
            identity.clone(),
            presentation.clone(),
        ));

        TestHarness {
            store,
            identity,
            presentation,
            session,
            config: self.config,
        }
    }
}

/// A chat session wired to mock collaborators.
pub struct TestHarness {
    pub store: Arc<MockStore>,
    pub identity: Arc<MockIdentity>,
    pub presentation: Arc<MockPresentation>,
    pub session: Arc<ChatSession>,
    pub config: ParleyConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs the session on a background task.
    pub fn start(&self) -> RunningSession {
        let cancel = CancellationToken::new();
        let session = self.session.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { session.run(token).await });
        RunningSession { cancel, handle }
    }

    /// Runs the session inline. Returns once it ends on its own.
    pub async fn run(&self) -> Result<SessionReport, ParleyError> {
        self.session.run(CancellationToken::new()).await
    }
}

/// A session running on a background task.
pub struct RunningSession {
    cancel: CancellationToken,
    handle: JoinHandle<Result<SessionReport, ParleyError>>,
}

impl RunningSession {
    /// Cancels the session and waits for it to finish.
    pub async fn stop(self) -> Result<SessionReport, ParleyError> {
        self.cancel.cancel();
        self.join().await
    }

    /// Waits for the session to end on its own.
    pub async fn join(self) -> Result<SessionReport, ParleyError> {
        self.handle
            .await
            .map_err(|e| ParleyError::Internal(format!("session task failed: {e}")))?
    }
}
