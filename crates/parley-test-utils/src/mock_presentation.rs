// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock presentation layer.
//!
//! Records everything the session renders and lets tests play the user:
//! type into the input, submit, and unmount the form.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use parley_core::{
    AdapterType, HealthStatus, ParleyError, PluginAdapter, PresentationAdapter, RenderedEntry,
    SubmitEvent,
};

use crate::lock;

enum Queued {
    /// Type this text into the input, then submit.
    Typed(String),
    /// Submit whatever is in the input.
    Current,
}

/// A mock UI surface.
pub struct MockPresentation {
    input: Mutex<String>,
    rendered: Mutex<Vec<RenderedEntry>>,
    status: Mutex<Option<String>>,
    status_history: Mutex<Vec<Option<String>>>,
    identity_label: Mutex<Option<String>>,
    submits: Mutex<VecDeque<Queued>>,
    unmounted: AtomicBool,
    scrolls: AtomicUsize,
    rebuilds: AtomicUsize,
    shutdowns: AtomicUsize,
    submit_notify: Notify,
    render_notify: Notify,
}

impl MockPresentation {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(String::new()),
            rendered: Mutex::new(Vec::new()),
            status: Mutex::new(None),
            status_history: Mutex::new(Vec::new()),
            identity_label: Mutex::new(None),
            submits: Mutex::new(VecDeque::new()),
            unmounted: AtomicBool::new(false),
            scrolls: AtomicUsize::new(0),
            rebuilds: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            submit_notify: Notify::new(),
            render_notify: Notify::new(),
        }
    }

    /// Replaces the input value without submitting.
    pub fn set_input(&self, text: impl Into<String>) {
        *lock(&self.input) = text.into();
    }

    pub fn input(&self) -> String {
        lock(&self.input).clone()
    }

    /// Queues a submission of `text`. The input is set when the event is taken.
    pub fn type_and_submit(&self, text: impl Into<String>) {
        lock(&self.submits).push_back(Queued::Typed(text.into()));
        self.submit_notify.notify_one();
    }

    /// Queues a submission of the current input value.
    pub fn submit(&self) {
        lock(&self.submits).push_back(Queued::Current);
        self.submit_notify.notify_one();
    }

    /// After queued submissions drain, `next_submit()` returns `None`.
    pub fn unmount(&self) {
        self.unmounted.store(true, Ordering::SeqCst);
        self.submit_notify.notify_one();
    }

    /// The list as currently displayed.
    pub fn rendered(&self) -> Vec<RenderedEntry> {
        lock(&self.rendered).clone()
    }

    pub fn rendered_texts(&self) -> Vec<String> {
        lock(&self.rendered).iter().map(|e| e.text.clone()).collect()
    }

    pub fn status(&self) -> Option<String> {
        lock(&self.status).clone()
    }

    /// Every `set_status` call, oldest first.
    pub fn status_history(&self) -> Vec<Option<String>> {
        lock(&self.status_history).clone()
    }

    pub fn identity_label(&self) -> Option<String> {
        lock(&self.identity_label).clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    /// Number of times the list was cleared for a rebuild.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Waits until a completed render satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F)
    where
        F: Fn(&[RenderedEntry]) -> bool,
    {
        loop {
            let notified = self.render_notify.notified();
            if predicate(&lock(&self.rendered)) {
                return;
            }
            notified.await;
        }
    }

    /// Waits until the displayed list has exactly `count` entries.
    pub async fn wait_for_entries(&self, count: usize) {
        self.wait_for(|entries| entries.len() == count).await;
    }
}

impl Default for MockPresentation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPresentation {
    fn name(&self) -> &str {
        "mock-presentation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Presentation
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
impl PresentationAdapter for MockPresentation {
    async fn next_submit(&self) -> Option<SubmitEvent> {
        loop {
            let notified = self.submit_notify.notified();
            {
                let next = lock(&self.submits).pop_front();
                match next {
                    Some(Queued::Typed(text)) => {
                        *lock(&self.input) = text;
                        return Some(SubmitEvent);
                    }
                    Some(Queued::Current) => return Some(SubmitEvent),
                    None if self.unmounted.load(Ordering::SeqCst) => return None,
                    None => {}
                }
            }
            notified.await;
        }
    }

    fn input_value(&self) -> String {
        lock(&self.input).clone()
    }

    fn clear_input(&self) {
        lock(&self.input).clear();
    }

    fn clear_messages(&self) {
        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        lock(&self.rendered).clear();
    }

    fn append_message(&self, entry: &RenderedEntry) {
        lock(&self.rendered).push(entry.clone());
    }

    fn scroll_to_latest(&self) {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        self.render_notify.notify_waiters();
    }

    fn set_status(&self, status: Option<&str>) {
        let status = status.map(str::to_string);
        lock(&self.status_history).push(status.clone());
        *lock(&self.status) = status;
    }

    fn set_identity_label(&self, label: &str) {
        *lock(&self.identity_label) = Some(label.to_string());
    }
}
