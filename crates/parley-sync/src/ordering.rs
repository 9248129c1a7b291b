// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side total ordering of snapshot contents.
//!
//! The subscription is deliberately unordered at the query level, so the
//! order is established here: committed messages ascend by commit stamp,
//! pending messages go wherever [`PendingPlacement`] says, and equal keys
//! keep their snapshot delivery order.

use std::cmp::Ordering;

use parley_core::{CommitTime, MessageRecord, PendingPlacement, Snapshot};

/// Converts a raw snapshot into a deterministic total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingReconciler {
    placement: PendingPlacement,
}

impl OrderingReconciler {
    pub fn new(placement: PendingPlacement) -> Self {
        Self { placement }
    }

    pub fn placement(&self) -> PendingPlacement {
        self.placement
    }

    /// Orders every message in the snapshot. Nothing is filtered out.
    pub fn order(&self, snapshot: &Snapshot) -> Vec<MessageRecord> {
        let mut ordered = snapshot.messages.clone();
        // `sort_by` is stable, which is what keeps ties in delivery order.
        ordered.sort_by(|a, b| self.compare(&a.commit_time, &b.commit_time));
        ordered
    }

    /// Total order on commit times under this reconciler's pending placement.
    pub fn compare(&self, a: &CommitTime, b: &CommitTime) -> Ordering {
        match (a, b) {
            (CommitTime::Committed(x), CommitTime::Committed(y)) => x.cmp(y),
            (CommitTime::Pending, CommitTime::Pending) => Ordering::Equal,
            (CommitTime::Pending, CommitTime::Committed(_)) => match self.placement {
                PendingPlacement::First => Ordering::Less,
                PendingPlacement::Last => Ordering::Greater,
            },
            (CommitTime::Committed(_), CommitTime::Pending) => match self.placement {
                PendingPlacement::First => Ordering::Greater,
                PendingPlacement::Last => Ordering::Less,
            },
        }
    }
}
