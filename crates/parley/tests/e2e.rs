// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: configuration through a live session on the
//! in-process backend.

use std::sync::Arc;
use std::time::Duration;

use parley_config::load_and_validate_str;
use parley_core::{Origin, PendingPlacement};
use parley_loopback::{LoopbackIdentity, LoopbackStore};
use parley_sync::ChatSession;
use parley_test_utils::MockPresentation;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn configured_session_sends_and_renders_through_loopback() {
    let config = load_and_validate_str(
        r#"
[app]
id = "e2e-room"

[identity]
continuation_token = "e2e-user-0001"

[sync]
pending_placement = "last"
"#,
    )
    .expect("config should be valid");
    assert_eq!(config.sync.pending_placement, PendingPlacement::Last);

    let store = Arc::new(LoopbackStore::for_backend(&config.backend).expect("demo backend"));
    let presentation = Arc::new(MockPresentation::new());
    let session = Arc::new(ChatSession::new(
        &config,
        store.clone(),
        Arc::new(LoopbackIdentity::new()),
        presentation.clone(),
    ));
    assert_eq!(
        session.collection_path().as_str(),
        "/artifacts/e2e-room/public/data/messages"
    );

    let cancel = CancellationToken::new();
    let task = {
        let session = session.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { session.run(cancel).await })
    };

    presentation.type_and_submit("hello from e2e");
    tokio::time::timeout(
        WAIT,
        presentation.wait_for(|entries| entries.iter().any(|e| e.text == "hello from e2e")),
    )
    .await
    .expect("message was not rendered in time");

    presentation.unmount();
    let report = tokio::time::timeout(WAIT, task)
        .await
        .expect("session did not end after unmount")
        .expect("session task panicked")
        .expect("session failed");

    assert_eq!(report.sent, 1);
    assert_eq!(
        presentation.identity_label().as_deref(),
        Some("ID: e2e-user...")
    );
    let rendered = presentation.rendered();
    assert_eq!(rendered[0].origin, Origin::Mine);
    assert_eq!(rendered[0].label, "You");
    assert_eq!(presentation.input(), "");
}

#[tokio::test]
async fn invalid_config_is_reported_before_any_session() {
    let errors = load_and_validate_str(
        r#"
[app]
id = "has/slash"
"#,
    )
    .expect_err("app id with a slash should be rejected");
    assert!(!errors.is_empty());
}
