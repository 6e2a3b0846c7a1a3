//! In-memory KV engine

use super::{apply_ops, KvEngine, KvTransaction};
use crate::core_store::errors::StoreResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryKv {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }
}

#[async_trait]
impl KvEngine for MemoryKv {
    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn commit(&self, txn: KvTransaction) -> StoreResult<()> {
        let mut data = self.data.write().await;
        apply_ops(&mut data, txn.into_ops());
        Ok(())
    }
}
