/*
    cast_store.rs - Casts

    Keyed by cast hash. Remove-wins: once a cast is removed it can never be
    re-added, whatever order the add and remove arrive in.
*/

use super::errors::{StoreError, StoreResult};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use crate::core_message::{CastId, Category, Fid, Message, MessageBody, MessageHash, MessageType};

pub struct CastKind;

impl SetKind for CastKind {
    type Key = MessageHash;

    const CATEGORY: Category = Category::Cast;
    const ADD_TYPE: MessageType = MessageType::CastAdd;
    const REMOVE_TYPE: Option<MessageType> = Some(MessageType::CastRemove);
    const RULE: ConflictRule = ConflictRule::RemoveWins;

    fn key(message: &Message) -> StoreResult<MessageHash> {
        match message.body() {
            MessageBody::CastAdd(_) => Ok(*message.hash()),
            MessageBody::CastRemove(body) => Ok(body.target_hash),
            _ => Err(StoreError::InvalidMessage(format!("{} has no cast body", message))),
        }
    }
}

pub type CastStore = MessageSet<CastKind>;

impl MessageSet<CastKind> {
    pub async fn get_cast_add(&self, fid: Fid, hash: MessageHash) -> StoreResult<Message> {
        self.get_add(fid, &hash).await
    }

    pub async fn get_cast_remove(&self, fid: Fid, target_hash: MessageHash) -> StoreResult<Message> {
        self.get_remove(fid, &target_hash).await
    }

    /// Live replies to a cast
    pub async fn get_casts_by_parent(&self, parent: &CastId) -> Vec<Message> {
        self.scan_adds(|_, message| match message.body() {
            MessageBody::CastAdd(body) => body.parent.as_ref() == Some(parent),
            _ => false,
        })
        .await
    }

    /// Live casts mentioning an account
    pub async fn get_casts_by_mention(&self, mention: Fid) -> Vec<Message> {
        self.scan_adds(|_, message| match message.body() {
            MessageBody::CastAdd(body) => body.mentions.contains(&mention),
            _ => false,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_store::test_support::{builder, fid, key_a, RecordingSink};
    use crate::core_store::{MergeOutcome, MessageStore};
    use std::sync::Arc;

    fn store() -> (CastStore, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (CastStore::new(sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_add_then_remove() {
        let (store, _) = store();
        let add = builder(1, 100).cast_add("hello").sign(&key_a()).unwrap();
        let remove = builder(1, 101).cast_remove(add.hash).sign(&key_a()).unwrap();

        assert!(store.merge(&add).await.unwrap().is_merged());
        let outcome = store.merge(&remove).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Merged { displaced: vec![add.clone()] });

        assert!(store.get_cast_add(fid(1), add.hash).await.unwrap_err().is_not_found());
        assert_eq!(store.get_cast_remove(fid(1), add.hash).await.unwrap(), remove);
    }

    #[tokio::test]
    async fn test_remove_before_add_blocks_add() {
        let (store, _) = store();
        let add = builder(1, 200).cast_add("late").sign(&key_a()).unwrap();
        // Remove carries an older timestamp than the add and still wins
        let remove = builder(1, 100).cast_remove(add.hash).sign(&key_a()).unwrap();

        store.merge(&remove).await.unwrap();
        assert_eq!(store.merge(&add).await.unwrap(), MergeOutcome::Superseded);
        assert!(store.get_adds_by_fid(fid(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_add() {
        let (store, sink) = store();
        let add = builder(1, 100).cast_add("hello").sign(&key_a()).unwrap();

        store.merge(&add).await.unwrap();
        assert_eq!(store.merge(&add).await.unwrap(), MergeOutcome::Duplicate);
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_parent_and_mention_indexes() {
        let (store, _) = store();
        let root = builder(1, 100).cast_add("root").sign(&key_a()).unwrap();
        let reply = builder(2, 101).cast_reply("reply", root.cast_id()).sign(&key_a()).unwrap();
        let mention = builder(3, 102)
            .cast_with_mentions("hi ", vec![(fid(1), 3)])
            .sign(&key_a())
            .unwrap();

        for message in [&root, &reply, &mention] {
            store.merge(message).await.unwrap();
        }

        assert_eq!(store.get_casts_by_parent(&root.cast_id()).await, vec![reply]);
        assert_eq!(store.get_casts_by_mention(fid(1)).await, vec![mention]);
        assert!(store.get_casts_by_mention(fid(9)).await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_other_categories() {
        let (store, _) = store();
        let follow = builder(1, 100).follow_add(fid(2)).sign(&key_a()).unwrap();
        assert!(matches!(store.merge(&follow).await, Err(StoreError::InvalidMessageType(_))));
    }
}
