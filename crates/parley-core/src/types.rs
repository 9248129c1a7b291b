// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the collaborator traits and the sync pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Store-assigned identifier of a message document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session-scoped identity issued by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl Identity {
    /// Returns the first `n` characters of the identifier.
    pub fn short(&self, n: usize) -> String {
        self.0.chars().take(n).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied credential for resuming a previously established identity.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value for handing to the identity collaborator.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContinuationToken([redacted])")
    }
}

/// Path of the message collection inside the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The public message collection of one application instance.
    pub fn for_app(app_id: &str) -> Self {
        Self(format!("/artifacts/{app_id}/public/data/messages"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authoritative commit value assigned by the store, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitStamp(pub i64);

impl CommitStamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }

    /// Converts back to a wall-clock time. `None` if the value is out of chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

/// Commit state of a message.
///
/// A message starts `Pending` on the submitting client and moves to
/// `Committed` exactly once, after which the stamp never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "stamp", rename_all = "snake_case")]
pub enum CommitTime {
    Pending,
    Committed(CommitStamp),
}

impl CommitTime {
    pub fn is_pending(&self) -> bool {
        matches!(self, CommitTime::Pending)
    }

    pub fn stamp(&self) -> Option<CommitStamp> {
        match self {
            CommitTime::Pending => None,
            CommitTime::Committed(stamp) => Some(*stamp),
        }
    }
}

/// Where `Pending` messages sit relative to `Committed` ones in the ordered view.
///
/// `Last` keeps a just-sent message at the bottom until it commits, so it
/// does not jump when its stamp arrives. `First` sorts pending messages as
/// if their stamp were zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PendingPlacement {
    First,
    #[default]
    Last,
}

/// A message document as delivered inside a snapshot.
///
/// `text` and `author_id` are optional because the collection is shared
/// with other writers; documents lacking either are dropped at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author_id: Option<Identity>,
    pub commit_time: CommitTime,
}

/// A message about to be appended. The store assigns id and commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub text: String,
    pub author_id: Identity,
}

/// Complete point-in-time contents of the message collection, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub messages: Vec<MessageRecord>,
}

impl Snapshot {
    pub fn new(messages: Vec<MessageRecord>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Whether a rendered message was written by the local identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Origin {
    Mine,
    Theirs,
}

/// One row of the rendered message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub id: MessageId,
    pub text: String,
    pub author_id: Identity,
    pub origin: Origin,
    /// `"You"` for own messages, `"User abcd"` for everyone else.
    pub label: String,
}

/// Derived projection the presentation layer is rebuilt from.
///
/// Always replaced wholesale from the latest snapshot; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub identity: Identity,
    pub entries: Vec<RenderedEntry>,
}

/// A form submission raised by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitEvent;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Identity,
    Presentation,
}
