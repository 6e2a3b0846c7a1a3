/*
    engine.rs - Engine façade

    Wires the stores, reflector, gate, router, revocation coordinator,
    registry ingestion and query surface together. The engine holds only
    shared handles; every component owns its own locking.
*/

use super::errors::HubResult;
use super::gate::ValidationGate;
use super::query::QuerySurface;
use super::reflector::{AuditRecord, EventReflector};
use super::registry::RegistryIngestor;
use super::revocation::{RevocationCoordinator, RevocationReport};
use super::router::MergeRouter;
use crate::config::{ConfigError, HubConfig, KvBackend};
use crate::core_message::{
    Fid, IdRegistryEvent, Message, MessageValidator, NameRegistryEvent, Network, Signer, ValidationRules,
};
use crate::core_store::{
    CustodyUpdate, HubEvent, KvEngine, LogKv, MemoryKv, MergeOutcome, NameUpdate, NodeState, NodeStateRecord,
    Stores,
};
use crate::metrics::{init_metrics, MetricsCollector, MetricsSnapshot};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub rules: ValidationRules,
    pub event_channel_capacity: usize,
    pub audit_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions { rules: ValidationRules::default(), event_channel_capacity: 1024, audit_capacity: 4096 }
    }
}

impl EngineOptions {
    pub fn for_network(network: Network) -> Self {
        EngineOptions { rules: ValidationRules { network, ..Default::default() }, ..Default::default() }
    }
}

pub struct Engine {
    stores: Arc<Stores>,
    reflector: Arc<EventReflector>,
    metrics: Arc<MetricsCollector>,
    router: MergeRouter,
    revocation: Arc<RevocationCoordinator>,
    registry: RegistryIngestor,
    query: QuerySurface,
}

impl Engine {
    pub fn new(options: EngineOptions, kv: Arc<dyn KvEngine>) -> Self {
        let reflector = Arc::new(EventReflector::new(options.event_channel_capacity, options.audit_capacity));
        let stores = Arc::new(Stores::new(reflector.clone()));
        let metrics = Arc::new(MetricsCollector::new());

        let revocation = Arc::new(RevocationCoordinator::new(&stores, reflector.clone(), metrics.clone()));
        let gate = ValidationGate::new(stores.clone(), MessageValidator::new(options.rules.clone()));
        let router =
            MergeRouter::new(gate, stores.clone(), revocation.clone(), reflector.clone(), metrics.clone());
        let registry = RegistryIngestor::new(stores.clone(), revocation.clone(), reflector.clone(), metrics.clone());
        let query = QuerySurface::new(stores.clone(), NodeStateRecord::new(kv), metrics.clone());

        info!(network = %options.rules.network, "engine started");
        Engine { stores, reflector, metrics, router, revocation, registry, query }
    }

    /// Engine with in-memory node state
    pub fn in_memory(network: Network) -> Self {
        Self::new(EngineOptions::for_network(network), Arc::new(MemoryKv::new()))
    }

    /// Build from configuration, opening the configured KV engine
    pub fn from_config(config: &HubConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let options = EngineOptions {
            rules: ValidationRules { network: config.network()?, max_future_secs: config.engine.max_future_secs },
            event_channel_capacity: config.engine.event_channel_capacity,
            audit_capacity: config.engine.audit_capacity,
        };

        let kv: Arc<dyn KvEngine> = match config.store.kv_backend {
            KvBackend::Memory => Arc::new(MemoryKv::new()),
            KvBackend::Log => {
                let path = config.store.kv_log_path();
                let log = LogKv::open(&path).map_err(|e| ConfigError::StoreOpen {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Arc::new(log)
            }
        };

        if config.metrics.enabled {
            init_metrics();
        }
        Ok(Self::new(options, kv))
    }

    /// Run the gate without merging
    pub async fn validate_message(&self, message: &Message) -> HubResult<Message> {
        self.router.gate().validate(message).await
    }

    pub async fn merge_message(&self, message: &Message, source: &str) -> HubResult<MergeOutcome> {
        self.router.merge_one(message, source).await
    }

    pub async fn merge_messages(&self, messages: &[Message], source: &str) -> Vec<HubResult<MergeOutcome>> {
        self.router.merge_many(messages, source).await
    }

    pub async fn revoke_messages_by_signer(&self, fid: Fid, signer: &Signer, source: &str) -> HubResult<RevocationReport> {
        self.revocation.revoke_by_signer(fid, signer, source).await
    }

    pub async fn apply_custody_event(&self, event: &IdRegistryEvent, source: &str) -> HubResult<CustodyUpdate> {
        self.registry.apply_custody_event(event, source).await
    }

    pub async fn apply_name_event(&self, event: &NameRegistryEvent, source: &str) -> HubResult<NameUpdate> {
        self.registry.apply_name_event(event, source).await
    }

    pub fn query(&self) -> &QuerySurface {
        &self.query
    }

    pub fn stores(&self) -> &Arc<Stores> {
        &self.stores
    }

    /// Receive every committed store event from now on
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.reflector.subscribe()
    }

    pub fn recent_audits(&self) -> Vec<AuditRecord> {
        self.reflector.recent_audits()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn get_node_state(&self) -> HubResult<NodeState> {
        self.query.get_node_state().await
    }

    pub async fn update_node_state<F>(&self, update: F) -> HubResult<NodeState>
    where
        F: FnOnce(&mut NodeState) + Send,
    {
        self.query.update_node_state(update).await
    }
}
