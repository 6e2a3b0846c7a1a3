/*
    registry.rs - Custody and name registry ingestion

    Accepts already-decoded chain events:
    - custody: Register and Transfer
    - name: Transfer and Renew

    Any other event type is refused before a store is touched. Events older
    than the stored one for the same fid or fname are accepted as no-ops.

    When a custody transfer moves an account to a new address, signer keys
    granted by the old address stop being active. Their messages are revoked,
    except for keys the new address has granted as well, and the old
    address's own signer messages are revoked last.
*/

use super::errors::{HubError, HubResult};
use super::reflector::{AuditRecord, EventReflector};
use super::revocation::RevocationCoordinator;
use crate::core_message::{
    IdRegistryEvent, IdRegistryEventType, NameRegistryEvent, NameRegistryEventType, Signer,
};
use crate::core_store::{CustodyUpdate, NameUpdate, Stores};
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RegistryIngestor {
    stores: Arc<Stores>,
    revocation: Arc<RevocationCoordinator>,
    reflector: Arc<EventReflector>,
    metrics: Arc<MetricsCollector>,
}

impl RegistryIngestor {
    pub fn new(
        stores: Arc<Stores>,
        revocation: Arc<RevocationCoordinator>,
        reflector: Arc<EventReflector>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        RegistryIngestor { stores, revocation, reflector, metrics }
    }

    pub async fn apply_custody_event(&self, event: &IdRegistryEvent, source: &str) -> HubResult<CustodyUpdate> {
        if !matches!(event.event_type, IdRegistryEventType::Register | IdRegistryEventType::Transfer) {
            debug!(fid = %event.fid, event_type = %event.event_type, "ignoring custody event type");
            return Err(HubError::request("invalid event type"));
        }

        let update = self.stores.signer.apply_custody_event(event).await?;
        let CustodyUpdate::Applied { previous } = &update else {
            return Ok(update);
        };

        self.metrics.record_registry_event();
        self.reflector.audit(AuditRecord::custody(event, source));

        if let Some(previous) = previous.as_ref().filter(|previous| previous.to != event.to) {
            self.revoke_previous_custody(previous, event, source).await?;
        }
        Ok(update)
    }

    async fn revoke_previous_custody(
        &self,
        previous: &IdRegistryEvent,
        current: &IdRegistryEvent,
        source: &str,
    ) -> HubResult<()> {
        let fid = current.fid;
        let still_granted = self.stores.signer.get_signer_keys_by_custody(fid, current.to).await;
        let stale_keys: Vec<_> = self
            .stores
            .signer
            .get_signer_keys_by_custody(fid, previous.to)
            .await
            .into_iter()
            .filter(|key| !still_granted.contains(key))
            .collect();

        info!(
            fid = %fid,
            old_custody = %previous.to,
            new_custody = %current.to,
            keys = stale_keys.len(),
            "custody moved, revoking old signers"
        );

        for key in stale_keys {
            self.revocation.revoke_by_signer(fid, &Signer::Key(key), source).await?;
        }
        self.revocation.revoke_by_signer(fid, &Signer::Custody(previous.to), source).await?;
        Ok(())
    }

    pub async fn apply_name_event(&self, event: &NameRegistryEvent, source: &str) -> HubResult<NameUpdate> {
        if !matches!(event.event_type, NameRegistryEventType::Transfer | NameRegistryEventType::Renew) {
            debug!(fname = %event.fname, event_type = %event.event_type, "ignoring name event type");
            return Err(HubError::request("invalid event type"));
        }

        let update = self.stores.user_data.apply_name_event(event).await?;
        if matches!(update, NameUpdate::Applied { .. }) {
            self.metrics.record_registry_event();
            self.reflector.audit(AuditRecord::name(event, source));
        }
        Ok(update)
    }
}
