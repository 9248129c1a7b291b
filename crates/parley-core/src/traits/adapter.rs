// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle surface shared by every collaborator.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{AdapterType, HealthStatus};

/// Common lifecycle for the store, identity and presentation collaborators.
///
/// The session probes [`health_check`](PluginAdapter::health_check) before
/// starting its loops and calls [`shutdown`](PluginAdapter::shutdown) once
/// when it is cancelled.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Adapter version.
    fn version(&self) -> semver::Version;

    /// Returns the kind of collaborator this adapter stands in for.
    fn adapter_type(&self) -> AdapterType;

    /// Reports whether the collaborator can currently be used.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError>;

    /// Releases streams and connections held by the adapter.
    async fn shutdown(&self) -> Result<(), ParleyError>;
}
