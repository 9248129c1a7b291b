// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat client.

use thiserror::Error;

/// The primary error type used across the collaborator traits and the sync pipeline.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Bad or missing backend configuration. Halts startup.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Identity resolution failed. The live subscription must not start.
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport fault on the live message feed.
    #[error("subscription error: {message}")]
    Subscription {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The store rejected or failed to acknowledge an append.
    #[error("send failed: {message}")]
    Send {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A document in a snapshot is missing a required field.
    #[error("malformed message {id}: {reason}")]
    MalformedMessage { id: String, reason: String },

    /// An operation was attempted before its precondition held.
    #[error("not ready: {0}")]
    NotReady(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Shorthand for an [`Authentication`](ParleyError::Authentication) error without a source.
    pub fn authentication(message: impl Into<String>) -> Self {
        ParleyError::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`Subscription`](ParleyError::Subscription) error without a source.
    pub fn subscription(message: impl Into<String>) -> Self {
        ParleyError::Subscription {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`Send`](ParleyError::Send) error without a source.
    pub fn send(message: impl Into<String>) -> Self {
        ParleyError::Send {
            message: message.into(),
            source: None,
        }
    }
}
