// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presentation adapter trait for the visual layer.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{RenderedEntry, SubmitEvent};

/// Adapter for the surface the conversation is displayed on.
///
/// Exposes a message list, a text input, a status/loader region and an
/// identity label. Markup and styling are the adapter's business.
#[async_trait]
pub trait PresentationAdapter: PluginAdapter {
    /// Waits for the next form submission. `None` once the form is unmounted.
    async fn next_submit(&self) -> Option<SubmitEvent>;

    /// Current value of the text input.
    fn input_value(&self) -> String;

    fn clear_input(&self);

    /// Removes every entry from the message list.
    fn clear_messages(&self);

    fn append_message(&self, entry: &RenderedEntry);

    /// Scrolls the message list to its most recent entry.
    fn scroll_to_latest(&self);

    /// Sets the status/loader text. `None` hides the region.
    fn set_status(&self, status: Option<&str>);

    fn set_identity_label(&self, label: &str);
}
