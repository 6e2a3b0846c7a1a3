//! Event Reflector
//!
//! Fans committed store events out to subscribers and keeps the audit
//! trail.
//!
//! Store events travel on a tokio broadcast channel; a subscriber that falls
//! more than the channel capacity behind sees `RecvError::Lagged` and
//! skips ahead. Audit records are logged at target `hubnode::audit` and the
//! most recent ones kept in a bounded ring.

use crate::core_message::{
    farcaster_time_now, Category, Fid, IdRegistryEvent, Message, MessageHash, NameRegistryEvent, Signer,
};
use crate::core_store::{EventSink, HubEvent, MergeOutcome};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{info, trace};

pub const AUDIT_TARGET: &str = "hubnode::audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    MergeMessage,
    RevokeSigner,
    MergeIdRegistryEvent,
    MergeNameRegistryEvent,
}

/// One audited state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub action: AuditAction,
    /// Who submitted the change (peer id, "rpc", "chain", ...)
    pub source: String,
    pub fid: Option<Fid>,
    pub category: Option<Category>,
    pub hash: Option<MessageHash>,
    pub detail: String,
    /// Farcaster time the record was made
    pub recorded_at: u32,
}

impl AuditRecord {
    fn new(action: AuditAction, source: &str, detail: String) -> Self {
        AuditRecord {
            action,
            source: source.to_string(),
            fid: None,
            category: None,
            hash: None,
            detail,
            recorded_at: farcaster_time_now(),
        }
    }

    pub fn merge(message: &Message, outcome: &MergeOutcome, source: &str) -> Self {
        AuditRecord {
            fid: Some(message.fid()),
            category: message.category(),
            hash: Some(*message.hash()),
            ..Self::new(AuditAction::MergeMessage, source, outcome.as_str().to_string())
        }
    }

    pub fn revoke(fid: Fid, signer: &Signer, revoked: usize, source: &str) -> Self {
        AuditRecord {
            fid: Some(fid),
            ..Self::new(AuditAction::RevokeSigner, source, format!("{} revoked {}", signer, revoked))
        }
    }

    pub fn custody(event: &IdRegistryEvent, source: &str) -> Self {
        AuditRecord {
            fid: Some(event.fid),
            category: Some(Category::Signer),
            ..Self::new(
                AuditAction::MergeIdRegistryEvent,
                source,
                format!("{} to {} at block {}", event.event_type, event.to, event.block_number),
            )
        }
    }

    pub fn name(event: &NameRegistryEvent, source: &str) -> Self {
        AuditRecord {
            category: Some(Category::UserData),
            ..Self::new(
                AuditAction::MergeNameRegistryEvent,
                source,
                format!("{} {} to {}", event.event_type, event.fname, event.to),
            )
        }
    }
}

pub struct EventReflector {
    tx: broadcast::Sender<HubEvent>,
    audits: Mutex<VecDeque<AuditRecord>>,
    audit_capacity: usize,
}

impl EventReflector {
    /// `event_capacity` and `audit_capacity` are clamped to at least 1
    pub fn new(event_capacity: usize, audit_capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(event_capacity.max(1));
        let audit_capacity = audit_capacity.max(1);
        EventReflector { tx, audits: Mutex::new(VecDeque::with_capacity(audit_capacity)), audit_capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Log and retain an audit record
    pub fn audit(&self, record: AuditRecord) {
        let payload = serde_json::to_string(&record).unwrap_or_else(|_| format!("{:?}", record));
        info!(
            target: AUDIT_TARGET,
            action = ?record.action,
            source = %record.source,
            fid = record.fid.map(|fid| fid.value()),
            record = %payload,
            "audit"
        );

        let mut audits = self.audits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if audits.len() == self.audit_capacity {
            audits.pop_front();
        }
        audits.push_back(record);
    }

    /// Retained audit records, oldest first
    pub fn recent_audits(&self) -> Vec<AuditRecord> {
        let audits = self.audits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        audits.iter().cloned().collect()
    }
}

impl Default for EventReflector {
    fn default() -> Self {
        Self::new(1024, 4096)
    }
}

impl EventSink for EventReflector {
    fn reflect(&self, event: HubEvent) {
        let kind = event.kind();
        // Sending fails only when nobody is subscribed
        let receivers = self.tx.send(event).unwrap_or(0);
        trace!(kind, receivers, "reflected event");
    }
}
