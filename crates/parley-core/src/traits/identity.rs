// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity adapter trait for the authentication service.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ContinuationToken, Identity};

/// Identity state-change notifications. `None` means "no identity".
pub type IdentityStream = Pin<Box<dyn Stream<Item = Option<Identity>> + Send>>;

/// Adapter for establishing a session identity.
#[async_trait]
pub trait IdentityAdapter: PluginAdapter {
    /// Subscribes to identity state changes. The current state is delivered first.
    async fn identity_changes(&self) -> Result<IdentityStream, ParleyError>;

    /// Resumes a previously established identity.
    async fn resume_with_token(&self, token: &ContinuationToken) -> Result<Identity, ParleyError>;

    /// Creates a fresh anonymous identity.
    async fn create_anonymous(&self) -> Result<Identity, ParleyError>;
}
