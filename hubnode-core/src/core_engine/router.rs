/*
    router.rs - Merge Router

    Sends a message through the gate and into the store that owns its
    category. Batches are merged one at a time with a result per message;
    nothing is shared between the elements of a batch.

    A Signer Remove that ends up as the current state for its key (merged
    now, or already present) cascades into a revocation of that key.

    The gate check and the store merge are separate steps with no lock
    across them. A Signer Remove merged concurrently can land in between,
    so its cascade misses a message that passed the gate but was not yet
    stored. Callers that need removes to win serialize their merges;
    `merge_messages` already does within a batch.
*/

use super::errors::{HubError, HubResult};
use super::gate::ValidationGate;
use super::reflector::{AuditRecord, EventReflector};
use super::revocation::RevocationCoordinator;
use crate::core_message::{Message, Signer};
use crate::core_store::{MergeOutcome, Stores};
use crate::metrics::{MetricsCollector, Timer, MERGE_DURATION_MS};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MergeRouter {
    gate: ValidationGate,
    stores: Arc<Stores>,
    revocation: Arc<RevocationCoordinator>,
    reflector: Arc<EventReflector>,
    metrics: Arc<MetricsCollector>,
}

impl MergeRouter {
    pub fn new(
        gate: ValidationGate,
        stores: Arc<Stores>,
        revocation: Arc<RevocationCoordinator>,
        reflector: Arc<EventReflector>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        MergeRouter { gate, stores, revocation, reflector, metrics }
    }

    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    /// Validate and merge one message
    pub async fn merge_one(&self, message: &Message, source: &str) -> HubResult<MergeOutcome> {
        let timer = Timer::new(MERGE_DURATION_MS);
        let result = self.route(message, source).await;
        timer.stop();

        match &result {
            Ok(outcome) => self.metrics.record_merge(outcome),
            Err(err) => {
                self.metrics.record_merge_failure();
                debug!(message = %message, source, kind = err.kind(), error = %err, "merge rejected");
            }
        }
        result
    }

    /// Merge each message in order; one result per input
    pub async fn merge_many(&self, messages: &[Message], source: &str) -> Vec<HubResult<MergeOutcome>> {
        let mut results = Vec::with_capacity(messages.len());
        for message in messages {
            results.push(self.merge_one(message, source).await);
        }
        results
    }

    async fn route(&self, message: &Message, source: &str) -> HubResult<MergeOutcome> {
        let category = message.category().ok_or_else(|| HubError::request("invalid message type"))?;
        let message = self.gate.validate(message).await?;

        let outcome = self.stores.store_for(category).merge(&message).await?;
        self.reflector.audit(AuditRecord::merge(&message, &outcome, source));

        if let Some(key) = message.removed_signer() {
            if !matches!(outcome, MergeOutcome::Superseded) {
                if let Err(err) = self.revocation.revoke_by_signer(message.fid(), &Signer::Key(key), source).await {
                    warn!(message = %message, error = %err, "signer remove merged but revocation failed");
                    return Err(err);
                }
            }
        }

        Ok(outcome)
    }
}
