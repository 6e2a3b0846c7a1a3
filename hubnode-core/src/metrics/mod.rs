//! Metrics for the merge pipeline
//!
//! Counters go through the `metrics` facade, so any installed recorder
//! picks them up. `MetricsCollector` keeps the same counts in-process for
//! snapshots.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

mod collector;

pub use collector::MetricsCollector;

pub const MERGE_TOTAL: &str = "hub.merge.total";
pub const MERGE_MERGED: &str = "hub.merge.merged";
pub const MERGE_DUPLICATE: &str = "hub.merge.duplicate";
pub const MERGE_SUPERSEDED: &str = "hub.merge.superseded";
pub const MERGE_FAILED: &str = "hub.merge.failed";
pub const MERGE_DURATION_MS: &str = "hub.merge.duration_ms";
pub const REVOKED_MESSAGES: &str = "hub.revoke.messages";
pub const REGISTRY_EVENTS: &str = "hub.registry.events";
pub const QUERIES: &str = "hub.query.total";

/// Register metric descriptions
pub fn init_metrics() {
    describe_counter!(MERGE_TOTAL, "Messages submitted for merge");
    describe_counter!(MERGE_MERGED, "Messages that entered a store");
    describe_counter!(MERGE_DUPLICATE, "Messages already present");
    describe_counter!(MERGE_SUPERSEDED, "Messages that lost conflict resolution");
    describe_counter!(MERGE_FAILED, "Messages rejected by the gate or a store");
    describe_histogram!(MERGE_DURATION_MS, "Merge duration in milliseconds");
    describe_counter!(REVOKED_MESSAGES, "Messages dropped by signer revocation");
    describe_counter!(REGISTRY_EVENTS, "Custody and name registry events applied");
    describe_counter!(QUERIES, "Query surface calls");
}

pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

pub fn record_histogram(name: &'static str, value: f64) {
    histogram!(name).record(value);
}

/// Records elapsed milliseconds into a histogram when stopped
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self { name, start: Instant::now() }
    }

    pub fn stop(self) {
        record_histogram(self.name, self.start.elapsed().as_secs_f64() * 1000.0);
    }
}

/// Point-in-time copy of the in-process counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub merges_total: u64,
    pub merges_merged: u64,
    pub merges_duplicate: u64,
    pub merges_superseded: u64,
    pub merges_failed: u64,
    pub messages_revoked: u64,
    pub registry_events: u64,
    pub queries: u64,
}
