/*
    traits.rs - Core store trait definitions

    Defines the unified interface every per-category store implements:
    - Merge a validated message under the category's CRDT rule
    - Revoke everything a signer produced
    - Read the materialized add and remove sets of an account

    Implementations must make merge commutative, associative, and
    idempotent, and must be safe to call concurrently for distinct fids.
*/

use super::errors::StoreResult;
use crate::core_message::{Category, Fid, Message, Signer};
use async_trait::async_trait;

/// Result of merging one message into a store
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Message is now part of the set; `displaced` lost conflict resolution
    Merged { displaced: Vec<Message> },

    /// Message was already present
    Duplicate,

    /// An existing message outranks this one; state unchanged
    Superseded,
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeOutcome::Merged { .. } => "merged",
            MergeOutcome::Duplicate => "duplicate",
            MergeOutcome::Superseded => "superseded",
        }
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Category of messages this store accepts
    fn category(&self) -> Category;

    /// Merge a message that already passed validation
    async fn merge(&self, message: &Message) -> StoreResult<MergeOutcome>;

    /// Drop every message of `fid` signed by `signer`, returning them.
    ///
    /// Revoking a signer with nothing stored is a no-op, so repeating a
    /// revocation is always safe.
    async fn revoke_by_signer(&self, fid: Fid, signer: &Signer) -> StoreResult<Vec<Message>>;

    /// Current add set of an account
    async fn get_adds_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>>;

    /// Current remove set (tombstones) of an account
    async fn get_removes_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>>;

    /// Union of the add and remove sets
    async fn get_all_messages_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        let mut messages = self.get_adds_by_fid(fid).await?;
        messages.extend(self.get_removes_by_fid(fid).await?);
        Ok(messages)
    }
}
