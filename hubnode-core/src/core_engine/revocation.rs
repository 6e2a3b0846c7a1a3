/*
    revocation.rs - Revocation Coordinator

    Removes everything a signer wrote for an account, one store at a time,
    in a fixed order (cast, follow, reaction, verification, user data,
    signer). There is no cross-store transaction: a failure part way through
    leaves the earlier stores revoked. Store revokes are idempotent, so
    running the same revocation again finishes the job.
*/

use super::errors::HubResult;
use super::reflector::{AuditRecord, EventReflector};
use crate::core_message::{Category, Fid, Message, Signer};
use crate::core_store::{MessageStore, Stores};
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use tracing::{info, warn};

/// Messages removed by one revocation, per category in visit order
#[derive(Debug, Clone, PartialEq)]
pub struct RevocationReport {
    pub fid: Fid,
    pub signer: Signer,
    pub revoked: Vec<(Category, Vec<Message>)>,
}

impl RevocationReport {
    pub fn total(&self) -> usize {
        self.revoked.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn revoked_in(&self, category: Category) -> &[Message] {
        self.revoked
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }
}

pub struct RevocationCoordinator {
    order: Vec<Arc<dyn MessageStore>>,
    reflector: Arc<EventReflector>,
    metrics: Arc<MetricsCollector>,
}

impl RevocationCoordinator {
    pub fn new(stores: &Stores, reflector: Arc<EventReflector>, metrics: Arc<MetricsCollector>) -> Self {
        Self::with_order(stores.revocation_order(), reflector, metrics)
    }

    /// Coordinator visiting `order` front to back
    pub fn with_order(
        order: Vec<Arc<dyn MessageStore>>,
        reflector: Arc<EventReflector>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        RevocationCoordinator { order, reflector, metrics }
    }

    /// Revoke every message of `fid` signed by `signer`
    pub async fn revoke_by_signer(&self, fid: Fid, signer: &Signer, source: &str) -> HubResult<RevocationReport> {
        let mut report = RevocationReport { fid, signer: *signer, revoked: Vec::with_capacity(self.order.len()) };

        for store in &self.order {
            match store.revoke_by_signer(fid, signer).await {
                Ok(messages) => report.revoked.push((store.category(), messages)),
                Err(err) => {
                    let completed: Vec<&str> = report.revoked.iter().map(|(c, _)| c.as_str()).collect();
                    warn!(
                        fid = %fid,
                        signer = %signer,
                        failed = %store.category(),
                        completed = ?completed,
                        error = %err,
                        "revocation stopped part way"
                    );
                    self.metrics.record_revoked(report.total() as u64);
                    return Err(err.into());
                }
            }
        }

        let total = report.total();
        self.metrics.record_revoked(total as u64);
        if total > 0 {
            info!(fid = %fid, signer = %signer, revoked = total, "signer revoked");
        }
        self.reflector.audit(AuditRecord::revoke(fid, signer, total, source));
        Ok(report)
    }
}
