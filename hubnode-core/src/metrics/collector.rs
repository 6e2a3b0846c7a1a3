//! In-process metrics collector

use super::{
    record_counter, MetricsSnapshot, MERGE_DUPLICATE, MERGE_FAILED, MERGE_MERGED, MERGE_SUPERSEDED,
    MERGE_TOTAL, QUERIES, REGISTRY_EVENTS, REVOKED_MESSAGES,
};
use crate::core_store::MergeOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts engine activity and mirrors it to the `metrics` facade
#[derive(Debug, Default)]
pub struct MetricsCollector {
    merges_total: AtomicU64,
    merges_merged: AtomicU64,
    merges_duplicate: AtomicU64,
    merges_superseded: AtomicU64,
    merges_failed: AtomicU64,
    messages_revoked: AtomicU64,
    registry_events: AtomicU64,
    queries: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a successful merge by outcome
    pub fn record_merge(&self, outcome: &MergeOutcome) {
        self.merges_total.fetch_add(1, Ordering::Relaxed);
        record_counter(MERGE_TOTAL, 1);
        let (counter, name) = match outcome {
            MergeOutcome::Merged { .. } => (&self.merges_merged, MERGE_MERGED),
            MergeOutcome::Duplicate => (&self.merges_duplicate, MERGE_DUPLICATE),
            MergeOutcome::Superseded => (&self.merges_superseded, MERGE_SUPERSEDED),
        };
        counter.fetch_add(1, Ordering::Relaxed);
        record_counter(name, 1);
    }

    pub fn record_merge_failure(&self) {
        self.merges_total.fetch_add(1, Ordering::Relaxed);
        self.merges_failed.fetch_add(1, Ordering::Relaxed);
        record_counter(MERGE_TOTAL, 1);
        record_counter(MERGE_FAILED, 1);
    }

    pub fn record_revoked(&self, count: u64) {
        self.messages_revoked.fetch_add(count, Ordering::Relaxed);
        record_counter(REVOKED_MESSAGES, count);
    }

    pub fn record_registry_event(&self) {
        self.registry_events.fetch_add(1, Ordering::Relaxed);
        record_counter(REGISTRY_EVENTS, 1);
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        record_counter(QUERIES, 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            merges_total: self.merges_total.load(Ordering::Relaxed),
            merges_merged: self.merges_merged.load(Ordering::Relaxed),
            merges_duplicate: self.merges_duplicate.load(Ordering::Relaxed),
            merges_superseded: self.merges_superseded.load(Ordering::Relaxed),
            merges_failed: self.merges_failed.load(Ordering::Relaxed),
            messages_revoked: self.messages_revoked.load(Ordering::Relaxed),
            registry_events: self.registry_events.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
        }
    }
}
