// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process collaborators for running Parley without a hosted backend.
//!
//! [`LoopbackStore`] keeps collections in memory and fans full snapshots out
//! to every subscriber. [`LoopbackIdentity`] mints identities locally.

pub mod identity;
pub mod store;

pub use identity::LoopbackIdentity;
pub use store::LoopbackStore;
