// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two sessions sharing one in-process store.

use std::sync::Arc;
use std::time::Duration;

use parley_config::ParleyConfig;
use parley_core::{Origin, ParleyError, RenderedEntry};
use parley_loopback::{LoopbackIdentity, LoopbackStore};
use parley_sync::{ChatSession, SessionReport};
use parley_test_utils::MockPresentation;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

struct Client {
    presentation: Arc<MockPresentation>,
    cancel: CancellationToken,
    task: JoinHandle<Result<SessionReport, ParleyError>>,
}

impl Client {
    fn join(store: &LoopbackStore, config: &ParleyConfig) -> Self {
        let presentation = Arc::new(MockPresentation::new());
        let session = ChatSession::new(
            config,
            Arc::new(store.share()),
            Arc::new(LoopbackIdentity::new()),
            presentation.clone(),
        );
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { session.run(token).await });
        Self {
            presentation,
            cancel,
            task,
        }
    }

    async fn wait_until<F>(&self, predicate: F)
    where
        F: Fn(&[RenderedEntry]) -> bool,
    {
        tokio::time::timeout(WAIT, self.presentation.wait_for(predicate))
            .await
            .expect("view did not converge in time");
    }

    async fn leave(self) -> SessionReport {
        self.cancel.cancel();
        self.task
            .await
            .expect("session task panicked")
            .expect("session failed")
    }
}

fn texts(entries: &[RenderedEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.text.as_str()).collect()
}

#[tokio::test]
async fn both_clients_converge_on_commit_order() {
    let store = LoopbackStore::new();
    let config = ParleyConfig::default();
    let alice = Client::join(&store, &config);
    let bob = Client::join(&store, &config);

    // Both sessions render the empty collection once subscribed.
    tokio::time::timeout(WAIT, async {
        while alice.presentation.scroll_count() == 0 || bob.presentation.scroll_count() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("sessions did not subscribe in time");

    alice.presentation.type_and_submit("hi");
    tokio::time::timeout(WAIT, async {
        while !alice.presentation.input().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("first send was not acknowledged");

    bob.presentation.type_and_submit("yo");
    alice.wait_until(|e| texts(e) == ["hi", "yo"]).await;
    bob.wait_until(|e| texts(e) == ["hi", "yo"]).await;

    let seen_by_alice = alice.presentation.rendered();
    assert_eq!(seen_by_alice[0].origin, Origin::Mine);
    assert_eq!(seen_by_alice[0].label, "You");
    assert_eq!(seen_by_alice[1].origin, Origin::Theirs);
    assert!(seen_by_alice[1].label.starts_with("User "));

    let seen_by_bob = bob.presentation.rendered();
    assert_eq!(seen_by_bob[0].origin, Origin::Theirs);
    assert_eq!(seen_by_bob[1].origin, Origin::Mine);

    let alice_report = alice.leave().await;
    let bob_report = bob.leave().await;
    assert_eq!(alice_report.sent, 1);
    assert_eq!(bob_report.sent, 1);
    assert_ne!(alice_report.identity, bob_report.identity);
}

#[tokio::test]
async fn sessions_in_different_apps_do_not_see_each_other() {
    let store = LoopbackStore::new();
    let mut other = ParleyConfig::default();
    other.app.id = "other-room".into();

    let here = Client::join(&store, &ParleyConfig::default());
    let there = Client::join(&store, &other);

    here.presentation.type_and_submit("local only");
    here.wait_until(|e| texts(e) == ["local only"]).await;

    there.presentation.type_and_submit("elsewhere");
    there.wait_until(|e| texts(e) == ["elsewhere"]).await;

    here.leave().await;
    there.leave().await;
}

#[tokio::test]
async fn leaving_client_does_not_end_the_conversation() {
    let store = LoopbackStore::new();
    let config = ParleyConfig::default();
    let alice = Client::join(&store, &config);
    let bob = Client::join(&store, &config);

    alice.presentation.type_and_submit("hi");
    bob.wait_until(|e| texts(e) == ["hi"]).await;

    let alice_report = alice.leave().await;
    assert_eq!(alice_report.sent, 1);

    bob.presentation.type_and_submit("still here");
    bob.wait_until(|e| texts(e) == ["hi", "still here"]).await;
    tokio::time::timeout(WAIT, async {
        while !bob.presentation.input().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("send was not acknowledged");

    let path = config.collection_path();
    let history = store.messages(&path).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text.as_deref(), Some("hi"));
    assert!(history.iter().all(|m| !m.commit_time.is_pending()));

    let latecomer = Client::join(&store, &config);
    latecomer.wait_until(|e| texts(e) == ["hi", "still here"]).await;

    bob.leave().await;
    latecomer.leave().await;
}
