//! Ordered snapshot history
//!
//! Append-only store of timestamped snapshots. Replaces the intrusive
//! linked lists of earlier detectors with an owned deque; out-of-order
//! appends are rejected without touching retained state.

use std::collections::VecDeque;

use thiserror::Error;

use crate::models::Snapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("snapshot timestamp {timestamp} precedes last retained timestamp {last}")]
    OutOfOrder { timestamp: i64, last: i64 },
}

/// Ordered, append-only history of snapshots.
///
/// Timestamps must be non-decreasing across appends. Retention is
/// unbounded unless a maximum count is configured, in which case the
/// oldest snapshot is evicted first.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: VecDeque<Snapshot>,
    max_snapshots: Option<usize>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store keeping at most `max` snapshots, oldest evicted first.
    pub fn bounded(max: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            max_snapshots: Some(max),
        }
    }

    /// Append a snapshot, returning a reference to the retained record.
    ///
    /// A snapshot older than the last retained one is rejected and the
    /// store is left untouched; equal timestamps are accepted.
    pub fn append(&mut self, snapshot: Snapshot) -> Result<&Snapshot, StoreError> {
        if let Some(last) = self.snapshots.back() {
            if snapshot.timestamp < last.timestamp {
                return Err(StoreError::OutOfOrder {
                    timestamp: snapshot.timestamp,
                    last: last.timestamp,
                });
            }
        }

        self.snapshots.push_back(snapshot);
        if let Some(max) = self.max_snapshots {
            // a zero cap still retains the latest snapshot
            while self.snapshots.len() > max.max(1) {
                self.snapshots.pop_front();
            }
        }

        Ok(self.snapshots.back().expect("store is non-empty after append"))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.front()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Seconds between the first and last retained snapshot.
    pub fn duration_secs(&self) -> i64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// The named metric's values across all retained snapshots, in
    /// insertion order. Snapshots missing the metric contribute 0 so
    /// paired series stay aligned.
    pub fn series_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.snapshots
            .iter()
            .map(move |snap| snap.series_value(name).unwrap_or(0.0))
    }
}
