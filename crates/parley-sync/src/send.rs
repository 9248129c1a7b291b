// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append path for new messages.
//!
//! The send path never touches the rendered list. A sent message shows up
//! only when the next snapshot carries it, like everyone else's.

use std::sync::Arc;

use parley_core::{
    CollectionPath, MessageId, NewMessage, ParleyError, PresentationAdapter, StoreAdapter,
};
use tracing::{debug, error, info};

use crate::identity::IdentityHandle;

/// Why a submission was dropped without contacting the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input was empty or whitespace only.
    EmptyText,
    /// No session identity yet.
    IdentityUnresolved,
}

/// Result of one submission.
#[derive(Debug)]
pub enum SendOutcome {
    /// The store acknowledged the append and the input was cleared.
    Sent(MessageId),
    /// Silent no-op; nothing was appended.
    Skipped(SkipReason),
    /// The append failed. The input was left as it was.
    Failed(ParleyError),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }
}

/// Validates and submits new messages, awaiting commit acknowledgment.
pub struct SendPath {
    store: Arc<dyn StoreAdapter + Send + Sync>,
    path: CollectionPath,
    identity: IdentityHandle,
    presentation: Arc<dyn PresentationAdapter + Send + Sync>,
}

impl SendPath {
    pub fn new(
        store: Arc<dyn StoreAdapter + Send + Sync>,
        path: CollectionPath,
        identity: IdentityHandle,
        presentation: Arc<dyn PresentationAdapter + Send + Sync>,
    ) -> Self {
        Self {
            store,
            path,
            identity,
            presentation,
        }
    }

    /// Submits the current input value.
    ///
    /// The input is cleared only after the store acknowledges the write. No
    /// outcome is surfaced to the user; failures are logged.
    pub async fn submit(&self) -> SendOutcome {
        let raw = self.presentation.input_value();
        let text = raw.trim();

        if text.is_empty() {
            debug!("ignoring empty submission");
            return SendOutcome::Skipped(SkipReason::EmptyText);
        }
        let Some(author_id) = self.identity.identity() else {
            debug!("ignoring submission before identity is resolved");
            return SendOutcome::Skipped(SkipReason::IdentityUnresolved);
        };

        let message = NewMessage {
            text: text.to_string(),
            author_id,
        };
        let length = message.text.chars().count();

        match self.store.append(&self.path, message).await {
            Ok(id) => {
                self.presentation.clear_input();
                info!(message_id = %id, length, "message sent");
                SendOutcome::Sent(id)
            }
            Err(e) => {
                error!(error = %e, path = %self.path, "error sending message");
                SendOutcome::Failed(e)
            }
        }
    }
}
