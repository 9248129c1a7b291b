// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent reconciliation of the displayed message list.
//!
//! [`RenderSync::project`] is a pure function of the ordered messages and
//! the local identity. [`RenderSync::apply`] rebuilds the presentation list
//! from scratch every time (no diffing) and then scrolls to the newest
//! entry. Nothing carries over between calls.

use std::sync::Arc;

use parley_core::{
    Identity, MessageRecord, Origin, ParleyError, PresentationAdapter, RenderedEntry, ViewState,
};
use tracing::debug;

/// Number of author-id characters shown next to other people's messages.
const AUTHOR_LABEL_CHARS: usize = 4;

/// Label shown next to the local identity's own messages.
const OWN_LABEL: &str = "You";

/// Rebuilds the presentation layer from an ordered message sequence.
pub struct RenderSync {
    presentation: Arc<dyn PresentationAdapter + Send + Sync>,
}

impl RenderSync {
    pub fn new(presentation: Arc<dyn PresentationAdapter + Send + Sync>) -> Self {
        Self { presentation }
    }

    /// Projects ordered messages into a view for `identity`.
    ///
    /// Messages without text or author are dropped; the rest keep their order.
    pub fn project(ordered: &[MessageRecord], identity: &Identity) -> ViewState {
        let entries = ordered
            .iter()
            .filter_map(|record| match render_entry(record, identity) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "skipping malformed message");
                    None
                }
            })
            .collect();

        ViewState {
            identity: identity.clone(),
            entries,
        }
    }

    /// Replaces the displayed list with `view` and scrolls to the latest entry.
    pub fn apply(&self, view: &ViewState) {
        self.presentation.clear_messages();
        for entry in &view.entries {
            self.presentation.append_message(entry);
        }
        self.presentation.scroll_to_latest();
    }

    /// [`project`](Self::project) then [`apply`](Self::apply).
    pub fn sync(&self, ordered: &[MessageRecord], identity: &Identity) -> ViewState {
        let view = Self::project(ordered, identity);
        self.apply(&view);
        view
    }
}

fn render_entry(record: &MessageRecord, identity: &Identity) -> Result<RenderedEntry, ParleyError> {
    let malformed = |reason: &str| ParleyError::MalformedMessage {
        id: record.id.0.clone(),
        reason: reason.to_string(),
    };

    let text = record
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("missing text"))?;
    let author = record
        .author_id
        .as_ref()
        .filter(|a| !a.as_str().is_empty())
        .ok_or_else(|| malformed("missing author"))?;

    let (origin, label) = if author == identity {
        (Origin::Mine, OWN_LABEL.to_string())
    } else {
        (
            Origin::Theirs,
            format!("User {}", author.short(AUTHOR_LABEL_CHARS)),
        )
    };

    Ok(RenderedEntry {
        id: record.id.clone(),
        text: text.to_string(),
        author_id: author.clone(),
        origin,
        label,
    })
}
