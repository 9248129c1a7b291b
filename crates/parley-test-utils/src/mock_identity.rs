// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock identity collaborator.
//!
//! The change feed replays a fixed script and then ends. Sign-in calls are
//! counted so tests can assert which path the bootstrap took.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;

use parley_core::{
    AdapterType, ContinuationToken, HealthStatus, Identity, IdentityAdapter, IdentityStream,
    ParleyError, PluginAdapter,
};

/// A mock identity service.
///
/// - `create_anonymous()` returns `anon-1`, `anon-2`, ...
/// - `resume_with_token(t)` returns `resumed:<t>`
/// - with [`failing`](Self::failing), both return an authentication error
pub struct MockIdentity {
    feed: Vec<Option<Identity>>,
    failure: Option<String>,
    anonymous: AtomicUsize,
    resumes: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl MockIdentity {
    /// Feed reports "no identity" once.
    pub fn signed_out() -> Self {
        Self::with_feed(vec![None])
    }

    /// Feed reports an existing identity.
    pub fn signed_in(identity: Identity) -> Self {
        Self::with_feed(vec![Some(identity)])
    }

    /// Feed replays `feed` and then closes.
    pub fn with_feed(feed: Vec<Option<Identity>>) -> Self {
        Self {
            feed,
            failure: None,
            anonymous: AtomicUsize::new(0),
            resumes: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Every sign-in attempt fails with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn anonymous_calls(&self) -> usize {
        self.anonymous.load(Ordering::SeqCst)
    }

    pub fn resume_calls(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), ParleyError> {
        match &self.failure {
            Some(message) => Err(ParleyError::authentication(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockIdentity {
    fn name(&self) -> &str {
        "mock-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl IdentityAdapter for MockIdentity {
    async fn identity_changes(&self) -> Result<IdentityStream, ParleyError> {
        Ok(futures::stream::iter(self.feed.clone()).boxed())
    }

    async fn resume_with_token(&self, token: &ContinuationToken) -> Result<Identity, ParleyError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(Identity(format!("resumed:{}", token.expose())))
    }

    async fn create_anonymous(&self) -> Result<Identity, ParleyError> {
        let n = self.anonymous.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_failure()?;
        Ok(Identity(format!("anon-{n}")))
    }
}
