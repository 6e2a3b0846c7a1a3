/*
    message_set.rs - Generic per-category CRDT message set

    One implementation backs all six stores. A `SetKind` describes a
    category: which message types add and remove, how a message maps to the
    logical entity it writes (its key), and which conflict rule applies.

    Each fid holds two maps from key to message: the add set and the remove
    set. A key lives in at most one of them.

    Conflict rules:
    - LastWriteWins: later timestamp wins; on a tie a remove beats an add;
      on a further tie the higher hash wins.
    - RemoveWins: once a remove for a key exists, no add for that key can
      enter the set again. Competing removes are ordered as above.

    Both rules are total orders over messages for a key, so merge results
    do not depend on arrival order.
*/

use super::errors::{StoreError, StoreResult};
use super::events::{EventSink, HubEvent};
use super::traits::{MergeOutcome, MessageStore};
use crate::core_message::{Category, Fid, Message, MessageHash, MessageType, Signer};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// How competing writes to one key resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictRule {
    LastWriteWins,
    RemoveWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Add,
    Remove,
}

/// Describes one message category
pub trait SetKind: Send + Sync + 'static {
    /// Logical entity a message writes, scoped to its fid
    type Key: Ord + Clone + Send + Sync + fmt::Debug;

    const CATEGORY: Category;
    const ADD_TYPE: MessageType;
    const REMOVE_TYPE: Option<MessageType>;
    const RULE: ConflictRule;

    fn key(message: &Message) -> StoreResult<Self::Key>;
}

struct FidSet<T> {
    adds: BTreeMap<T, Message>,
    removes: BTreeMap<T, Message>,
}

impl<T> Default for FidSet<T> {
    fn default() -> Self {
        FidSet { adds: BTreeMap::new(), removes: BTreeMap::new() }
    }
}

impl<T: Ord> FidSet<T> {
    fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

/// Total order used to pick a winner between two messages for one key
fn precedence(message: &Message, side: Side) -> (u32, u8, MessageHash) {
    let side_rank = match side {
        Side::Add => 0,
        Side::Remove => 1,
    };
    (message.timestamp(), side_rank, *message.hash())
}

/// In-memory CRDT set for one category
pub struct MessageSet<K: SetKind> {
    fids: RwLock<BTreeMap<Fid, FidSet<K::Key>>>,
    sink: Arc<dyn EventSink>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: SetKind> MessageSet<K> {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        MessageSet { fids: RwLock::new(BTreeMap::new()), sink, _kind: PhantomData }
    }

    fn side(message_type: MessageType) -> Option<Side> {
        if message_type == K::ADD_TYPE {
            Some(Side::Add)
        } else if Some(message_type) == K::REMOVE_TYPE {
            Some(Side::Remove)
        } else {
            None
        }
    }

    /// Add-set entry for a key
    pub async fn get_add(&self, fid: Fid, key: &K::Key) -> StoreResult<Message> {
        let fids = self.fids.read().await;
        fids.get(&fid)
            .and_then(|set| set.adds.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} add {:?} for fid {}", K::CATEGORY, key, fid)))
    }

    /// Remove-set entry for a key
    pub async fn get_remove(&self, fid: Fid, key: &K::Key) -> StoreResult<Message> {
        let fids = self.fids.read().await;
        fids.get(&fid)
            .and_then(|set| set.removes.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} remove {:?} for fid {}", K::CATEGORY, key, fid)))
    }

    /// Adds of one fid whose key passes `filter`
    pub async fn adds_by_fid_where<F>(&self, fid: Fid, filter: F) -> Vec<Message>
    where
        F: Fn(&K::Key) -> bool,
    {
        let fids = self.fids.read().await;
        fids.get(&fid)
            .map(|set| {
                set.adds.iter().filter(|(key, _)| filter(key)).map(|(_, m)| m.clone()).collect()
            })
            .unwrap_or_default()
    }

    /// Adds across all fids matching `filter`
    pub async fn scan_adds<F>(&self, filter: F) -> Vec<Message>
    where
        F: Fn(&K::Key, &Message) -> bool,
    {
        let fids = self.fids.read().await;
        fids.values()
            .flat_map(|set| set.adds.iter())
            .filter(|(key, message)| filter(key, message))
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn merge_last_write_wins(set: &mut FidSet<K::Key>, key: K::Key, side: Side, message: &Message) -> MergeOutcome {
        let current = set
            .adds
            .get(&key)
            .map(|m| (m, Side::Add))
            .or_else(|| set.removes.get(&key).map(|m| (m, Side::Remove)));

        if let Some((existing, existing_side)) = current {
            if existing.hash() == message.hash() {
                return MergeOutcome::Duplicate;
            }
            if precedence(existing, existing_side) > precedence(message, side) {
                return MergeOutcome::Superseded;
            }
        }

        let mut displaced = Vec::new();
        displaced.extend(set.adds.remove(&key));
        displaced.extend(set.removes.remove(&key));
        match side {
            Side::Add => set.adds.insert(key, message.clone()),
            Side::Remove => set.removes.insert(key, message.clone()),
        };
        MergeOutcome::Merged { displaced }
    }

    fn merge_remove_wins(set: &mut FidSet<K::Key>, key: K::Key, side: Side, message: &Message) -> MergeOutcome {
        match side {
            Side::Add => {
                if set.removes.contains_key(&key) {
                    return MergeOutcome::Superseded;
                }
                if let Some(existing) = set.adds.get(&key) {
                    if existing.hash() == message.hash() {
                        return MergeOutcome::Duplicate;
                    }
                    if precedence(existing, Side::Add) > precedence(message, Side::Add) {
                        return MergeOutcome::Superseded;
                    }
                }
                let displaced = set.adds.insert(key, message.clone()).into_iter().collect();
                MergeOutcome::Merged { displaced }
            }
            Side::Remove => {
                if let Some(existing) = set.removes.get(&key) {
                    if existing.hash() == message.hash() {
                        return MergeOutcome::Duplicate;
                    }
                    if precedence(existing, Side::Remove) > precedence(message, Side::Remove) {
                        return MergeOutcome::Superseded;
                    }
                }
                let mut displaced = Vec::new();
                displaced.extend(set.adds.remove(&key));
                displaced.extend(set.removes.insert(key, message.clone()));
                MergeOutcome::Merged { displaced }
            }
        }
    }
}

#[async_trait]
impl<K: SetKind> MessageStore for MessageSet<K> {
    fn category(&self) -> Category {
        K::CATEGORY
    }

    async fn merge(&self, message: &Message) -> StoreResult<MergeOutcome> {
        let side = Self::side(message.message_type()).ok_or_else(|| {
            StoreError::InvalidMessageType(format!("{} store cannot merge {}", K::CATEGORY, message.message_type()))
        })?;
        let key = K::key(message)?;

        let outcome = {
            let mut fids = self.fids.write().await;
            let set = fids.entry(message.fid()).or_default();
            match K::RULE {
                ConflictRule::LastWriteWins => Self::merge_last_write_wins(set, key, side, message),
                ConflictRule::RemoveWins => Self::merge_remove_wins(set, key, side, message),
            }
        };

        trace!(category = %K::CATEGORY, message = %message, outcome = outcome.as_str(), "merge");

        if let MergeOutcome::Merged { displaced } = &outcome {
            self.sink.reflect(HubEvent::MergeMessage { message: message.clone(), deleted: displaced.clone() });
        }
        Ok(outcome)
    }

    async fn revoke_by_signer(&self, fid: Fid, signer: &Signer) -> StoreResult<Vec<Message>> {
        let mut revoked = Vec::new();
        {
            let mut fids = self.fids.write().await;
            if let Some(set) = fids.get_mut(&fid) {
                let mut take = |_: &K::Key, message: &mut Message| {
                    if message.signer() == signer {
                        revoked.push(message.clone());
                        false
                    } else {
                        true
                    }
                };
                set.adds.retain(&mut take);
                set.removes.retain(&mut take);
                if set.is_empty() {
                    fids.remove(&fid);
                }
            }
        }

        if !revoked.is_empty() {
            debug!(category = %K::CATEGORY, fid = %fid, signer = %signer, count = revoked.len(), "revoked messages");
        }
        for message in &revoked {
            self.sink.reflect(HubEvent::RevokeMessage { message: message.clone() });
        }
        Ok(revoked)
    }

    async fn get_adds_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        let fids = self.fids.read().await;
        Ok(fids.get(&fid).map(|set| set.adds.values().cloned().collect()).unwrap_or_default())
    }

    async fn get_removes_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        let fids = self.fids.read().await;
        Ok(fids.get(&fid).map(|set| set.removes.values().cloned().collect()).unwrap_or_default())
    }
}
