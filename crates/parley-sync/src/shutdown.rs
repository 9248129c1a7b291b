// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal-driven session teardown.
//!
//! SIGTERM and SIGINT (Ctrl+C) cancel the [`CancellationToken`] passed to
//! [`ChatSession::run`](crate::ChatSession::run), which ends the subscription
//! and releases the collaborators.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a token that is cancelled when either signal arrives. Cancelling
/// the token from elsewhere also stops the handler task.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let watcher = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = watcher.cancelled() => {
                debug!("session ended before any shutdown signal");
                return;
            }
            _ = wait_for_signal() => {}
        }
        watcher.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT (Ctrl+C), closing session");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, closing session");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

/// Resolves on Ctrl+C. Never resolves if the listener cannot be installed.
async fn wait_for_ctrl_c() {
    wait_for_interrupt(tokio::signal::ctrl_c()).await;
}

async fn wait_for_interrupt<F>(interrupt: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => info!("received SIGINT (Ctrl+C), closing session"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+C, session will not stop on it");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_interrupt_listener_never_resolves() {
        let failing = async { Err(std::io::Error::other("no signal driver")) };
        let waited =
            tokio::time::timeout(Duration::from_secs(3600), wait_for_interrupt(failing)).await;
        assert!(waited.is_err(), "a failed listener must not end the session");
    }

    #[tokio::test]
    async fn delivered_interrupt_resolves() {
        wait_for_interrupt(async { Ok(()) }).await;
    }

    #[tokio::test]
    async fn external_cancel_is_observed() {
        let token = install_signal_handler();
        let child = token.child_token();
        token.cancel();
        child.cancelled().await;
        assert!(child.is_cancelled());
    }
}
