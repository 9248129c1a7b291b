// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronization pipeline for a shared, append-only message stream.
//!
//! Identity bootstrap gates a single live subscription. Every pushed
//! snapshot is totally ordered on the client and rendered by a full,
//! idempotent rebuild. The send path writes to the store and never touches
//! the rendered list directly.

pub mod identity;
pub mod ordering;
pub mod render;
pub mod send;
pub mod session;
pub mod shutdown;
pub mod subscription;

pub use identity::{IdentityBootstrap, IdentityHandle, IdentityState};
pub use ordering::OrderingReconciler;
pub use render::RenderSync;
pub use send::{SendOutcome, SendPath, SkipReason};
pub use session::{
    AUTH_FAILED_STATUS, CONNECT_ERROR_STATUS, CONNECTING_STATUS, ChatSession, SessionReport,
    identity_label,
};
pub use shutdown::install_signal_handler;
pub use subscription::{ResubscribePolicy, SubscriptionManager, SubscriptionReport};
