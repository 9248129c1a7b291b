// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session identity bootstrap.
//!
//! States: `Unresolved -> Resolving -> Resolved(identity) | Failed`.
//!
//! The bootstrap listens to the identity collaborator's change feed. When
//! the feed reports "no identity" it makes one sign-in attempt: resume via
//! the configured continuation token if there is one, otherwise anonymous
//! creation. The feed is not polled while that attempt is in flight, so at
//! most one attempt is ever outstanding.
//!
//! The resolved identity is published through a `watch` channel. The
//! bootstrap holds the only sender and is consumed by [`IdentityBootstrap::resolve`],
//! so nothing can change the identity once the session has one.

use std::sync::Arc;

use futures::StreamExt;
use parley_core::{ContinuationToken, Identity, IdentityAdapter, ParleyError};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Resolution state of the session identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    Unresolved,
    Resolving,
    Resolved(Identity),
    /// Terminal. Carries the message shown to the user.
    Failed(String),
}

impl IdentityState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityState::Resolved(identity) => Some(identity),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdentityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityState::Unresolved => write!(f, "unresolved"),
            IdentityState::Resolving => write!(f, "resolving"),
            IdentityState::Resolved(_) => write!(f, "resolved"),
            IdentityState::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Read-only view of the session identity.
#[derive(Debug, Clone)]
pub struct IdentityHandle {
    rx: watch::Receiver<IdentityState>,
}

impl IdentityHandle {
    /// Current state, cloned out of the channel.
    pub fn state(&self) -> IdentityState {
        self.rx.borrow().clone()
    }

    /// The resolved identity, if there is one yet.
    pub fn identity(&self) -> Option<Identity> {
        self.rx.borrow().identity().cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.rx.borrow().identity().is_some()
    }

    /// Waits until the identity is resolved or has failed.
    pub async fn wait_resolved(&mut self) -> Result<Identity, ParleyError> {
        let state = self
            .rx
            .wait_for(|s| matches!(s, IdentityState::Resolved(_) | IdentityState::Failed(_)))
            .await
            .map_err(|_| ParleyError::authentication("identity bootstrap dropped"))?;
        match &*state {
            IdentityState::Resolved(identity) => Ok(identity.clone()),
            IdentityState::Failed(message) => Err(ParleyError::authentication(message.clone())),
            _ => Err(ParleyError::Internal("identity wait ended early".into())),
        }
    }
}

/// Resolves the session identity before anything else may proceed.
pub struct IdentityBootstrap {
    adapter: Arc<dyn IdentityAdapter + Send + Sync>,
    token: Option<ContinuationToken>,
    state: watch::Sender<IdentityState>,
}

impl IdentityBootstrap {
    /// Create a bootstrap and the handle the rest of the session reads from.
    pub fn new(
        adapter: Arc<dyn IdentityAdapter + Send + Sync>,
        token: Option<ContinuationToken>,
    ) -> (Self, IdentityHandle) {
        let (state, rx) = watch::channel(IdentityState::Unresolved);
        (
            Self {
                adapter,
                token,
                state,
            },
            IdentityHandle { rx },
        )
    }

    /// Another read handle onto the same state.
    pub fn handle(&self) -> IdentityHandle {
        IdentityHandle {
            rx: self.state.subscribe(),
        }
    }

    /// Drives the identity feed until an identity is resolved or resolution fails.
    ///
    /// On failure the state becomes [`IdentityState::Failed`] and an
    /// [`Authentication`](ParleyError::Authentication) error is returned.
    pub async fn resolve(self) -> Result<Identity, ParleyError> {
        let mut changes = match self.adapter.identity_changes().await {
            Ok(changes) => changes,
            Err(e) => return Err(self.fail(e)),
        };

        while let Some(change) = changes.next().await {
            match change {
                Some(identity) => {
                    debug!("identity collaborator reported an existing identity");
                    return Ok(self.resolved(identity));
                }
                None => {
                    self.state.send_replace(IdentityState::Resolving);
                    let attempt = match &self.token {
                        Some(token) => {
                            info!("no identity found, resuming with continuation token");
                            self.adapter.resume_with_token(token).await
                        }
                        None => {
                            info!("no identity found, signing in anonymously");
                            self.adapter.create_anonymous().await
                        }
                    };
                    return match attempt {
                        Ok(identity) => Ok(self.resolved(identity)),
                        Err(e) => Err(self.fail(e)),
                    };
                }
            }
        }

        Err(self.fail(ParleyError::authentication(
            "identity feed closed before an identity was resolved",
        )))
    }

    fn resolved(&self, identity: Identity) -> Identity {
        info!(identity = %identity.short(8), "session identity resolved");
        self.state
            .send_replace(IdentityState::Resolved(identity.clone()));
        identity
    }

    fn fail(&self, err: ParleyError) -> ParleyError {
        error!(error = %err, "identity resolution failed");
        let err = match err {
            ParleyError::Authentication { .. } => err,
            other => ParleyError::Authentication {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        };
        self.state
            .send_replace(IdentityState::Failed(err.to_string()));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_test_utils::MockIdentity;

    #[tokio::test]
    async fn anonymous_sign_in_when_no_token() {
        let adapter = Arc::new(MockIdentity::signed_out());
        let (bootstrap, handle) = IdentityBootstrap::new(adapter.clone(), None);

        assert_eq!(handle.state(), IdentityState::Unresolved);
        let identity = bootstrap.resolve().await.expect("should resolve");

        assert_eq!(identity, Identity("anon-1".into()));
        assert_eq!(handle.identity(), Some(identity));
        assert_eq!(adapter.anonymous_calls(), 1);
        assert_eq!(adapter.resume_calls(), 0);
    }

    #[tokio::test]
    async fn continuation_token_skips_anonymous_creation() {
        let adapter = Arc::new(MockIdentity::signed_out());
        let token = ContinuationToken::new("resume-abc");
        let (bootstrap, handle) = IdentityBootstrap::new(adapter.clone(), Some(token));

        let identity = bootstrap.resolve().await.expect("should resolve");

        assert_eq!(identity, Identity("resumed:resume-abc".into()));
        assert!(handle.is_resolved());
        assert_eq!(adapter.resume_calls(), 1);
        assert_eq!(adapter.anonymous_calls(), 0);
    }

    #[tokio::test]
    async fn existing_identity_needs_no_sign_in() {
        let adapter = Arc::new(MockIdentity::signed_in(Identity("u-existing".into())));
        let (bootstrap, _handle) = IdentityBootstrap::new(adapter.clone(), None);

        let identity = bootstrap.resolve().await.expect("should resolve");

        assert_eq!(identity.as_str(), "u-existing");
        assert_eq!(adapter.anonymous_calls(), 0);
        assert_eq!(adapter.resume_calls(), 0);
    }

    #[tokio::test]
    async fn failed_sign_in_is_terminal() {
        let adapter = Arc::new(MockIdentity::signed_out().failing("backend refused"));
        let (bootstrap, handle) = IdentityBootstrap::new(adapter, None);

        let err = bootstrap.resolve().await.expect_err("should fail");

        assert!(matches!(err, ParleyError::Authentication { .. }));
        assert!(matches!(handle.state(), IdentityState::Failed(_)));
        assert!(handle.identity().is_none());
    }

    #[tokio::test]
    async fn closed_feed_fails_resolution() {
        let adapter = Arc::new(MockIdentity::with_feed(Vec::new()));
        let (bootstrap, handle) = IdentityBootstrap::new(adapter, None);

        let err = bootstrap.resolve().await.expect_err("should fail");
        assert!(err.to_string().contains("feed closed"));
        assert!(matches!(handle.state(), IdentityState::Failed(_)));
    }

    #[tokio::test]
    async fn wait_resolved_sees_outcome() {
        let adapter = Arc::new(MockIdentity::signed_out());
        let (bootstrap, handle) = IdentityBootstrap::new(adapter, None);
        let mut waiter = handle.clone();

        let waiting = tokio::spawn(async move { waiter.wait_resolved().await });
        let resolved = bootstrap.resolve().await.expect("should resolve");

        let seen = waiting.await.expect("join").expect("should resolve");
        assert_eq!(seen, resolved);
    }

    #[tokio::test]
    async fn later_identity_changes_are_ignored() {
        let adapter = Arc::new(MockIdentity::with_feed(vec![
            Some(Identity("first".into())),
            Some(Identity("second".into())),
        ]));
        let (bootstrap, handle) = IdentityBootstrap::new(adapter, None);

        let identity = bootstrap.resolve().await.expect("should resolve");
        assert_eq!(identity.as_str(), "first");
        assert_eq!(handle.identity().map(|i| i.0), Some("first".to_string()));
    }
}
