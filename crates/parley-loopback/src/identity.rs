// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local identity service.
//!
//! A continuation token resumes as the identity it names. Anonymous sign-in
//! mints a random UUID. The change feed replays the current identity (or
//! `None`) and then every sign-in.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::watch;
use tracing::info;

use parley_core::{
    AdapterType, ContinuationToken, HealthStatus, Identity, IdentityAdapter, IdentityStream,
    ParleyError, PluginAdapter,
};

pub struct LoopbackIdentity {
    current: watch::Sender<Option<Identity>>,
}

impl LoopbackIdentity {
    /// Starts signed out.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Starts already signed in as `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        let (current, _) = watch::channel(Some(identity));
        Self { current }
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn sign_in(&self, identity: Identity) -> Identity {
        self.current.send_replace(Some(identity.clone()));
        identity
    }
}

impl Default for LoopbackIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for LoopbackIdentity {
    fn name(&self) -> &str {
        "loopback-identity"
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
        Ok(())
    }
}

#[async_trait]
impl IdentityAdapter for LoopbackIdentity {
    async fn identity_changes(&self) -> Result<IdentityStream, ParleyError> {
        let mut rx = self.current.subscribe();
        let first = rx.borrow_and_update().clone();
        let later = futures::stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let next = rx.borrow_and_update().clone();
            Some((next, rx))
        });
        Ok(futures::stream::once(async move { first }).chain(later).boxed())
    }

    async fn resume_with_token(&self, token: &ContinuationToken) -> Result<Identity, ParleyError> {
        let value = token.expose().trim();
        if value.is_empty() {
            return Err(ParleyError::authentication("continuation token is empty"));
        }
        info!("resumed identity from continuation token");
        Ok(self.sign_in(Identity(value.to_string())))
    }

    async fn create_anonymous(&self) -> Result<Identity, ParleyError> {
        let identity = Identity(uuid::Uuid::new_v4().to_string());
        info!("created anonymous identity");
        Ok(self.sign_in(identity))
    }
}
