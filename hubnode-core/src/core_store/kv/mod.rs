/*
    kv - Transactional key-value engine

    Writes are buffered in a `KvTransaction` and become visible together on
    `commit`. Readers never observe half of a transaction.

    Engines:
    - MemoryKv: process-local map
    - LogKv: map rebuilt from an append-only, checksummed batch log
*/

pub mod log_kv;
pub mod memory;

pub use log_kv::LogKv;
pub use memory::MemoryKv;

use super::errors::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single buffered write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Batch of writes committed atomically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvTransaction {
    ops: Vec<KvOp>,
}

impl KvTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(KvOp::Put { key: key.into(), value: value.into() });
        self
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.ops.push(KvOp::Delete { key: key.into() });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[KvOp] {
        &self.ops
    }

    pub(crate) fn into_ops(self) -> Vec<KvOp> {
        self.ops
    }
}

#[async_trait]
pub trait KvEngine: Send + Sync {
    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Start an empty transaction
    fn begin(&self) -> KvTransaction {
        KvTransaction::new()
    }

    /// Apply every write of `txn`, or none of them
    async fn commit(&self, txn: KvTransaction) -> StoreResult<()>;
}

/// Apply a batch to a map, later ops winning
pub(crate) fn apply_ops(map: &mut BTreeMap<Vec<u8>, Vec<u8>>, ops: Vec<KvOp>) {
    for op in ops {
        match op {
            KvOp::Put { key, value } => {
                map.insert(key, value);
            }
            KvOp::Delete { key } => {
                map.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_buffers_in_order() {
        let mut txn = KvTransaction::new();
        txn.put("a", "1").delete("a").put("b", "2");
        assert_eq!(txn.len(), 3);

        let mut map = BTreeMap::new();
        apply_ops(&mut map, txn.into_ops());
        assert_eq!(map.get(b"a".as_slice()), None);
        assert_eq!(map.get(b"b".as_slice()), Some(&b"2".to_vec()));
    }
}
