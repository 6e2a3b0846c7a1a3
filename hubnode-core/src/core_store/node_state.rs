/*
    node_state.rs - Node sync progress

    A single record, stored under `node_state` in the KV engine, tracking
    how far chain event ingestion has progressed.

    Updates are read-modify-write with no lock across the read and the
    write; callers serialize updates themselves.
*/

use super::errors::StoreResult;
use super::kv::KvEngine;
use crate::core_message::farcaster_time_now;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const NODE_STATE_KEY: &[u8] = b"node_state";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub last_synced_block: u64,
    pub last_synced_log_index: u32,
    /// Farcaster time of the last update
    pub updated_at: u32,
}

pub struct NodeStateRecord {
    kv: Arc<dyn KvEngine>,
}

impl NodeStateRecord {
    pub fn new(kv: Arc<dyn KvEngine>) -> Self {
        NodeStateRecord { kv }
    }

    /// Current state; a node that never synced reads as the default
    pub async fn get(&self) -> StoreResult<NodeState> {
        match self.kv.get(NODE_STATE_KEY).await? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(NodeState::default()),
        }
    }

    /// Apply `update` to the stored state and write it back
    pub async fn update<F>(&self, update: F) -> StoreResult<NodeState>
    where
        F: FnOnce(&mut NodeState) + Send,
    {
        let mut state = self.get().await?;
        update(&mut state);
        state.updated_at = farcaster_time_now();

        let mut txn = self.kv.begin();
        txn.put(NODE_STATE_KEY, bincode::serialize(&state)?);
        self.kv.commit(txn).await?;

        debug!(block = state.last_synced_block, log_index = state.last_synced_log_index, "node state updated");
        Ok(state)
    }
}
