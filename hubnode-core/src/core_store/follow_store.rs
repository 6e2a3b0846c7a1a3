/*
    follow_store.rs - Follows

    Keyed by target fid, last-write-wins.
*/

use super::errors::{StoreError, StoreResult};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use crate::core_message::{Category, Fid, Message, MessageBody, MessageType};

pub struct FollowKind;

impl SetKind for FollowKind {
    type Key = Fid;

    const CATEGORY: Category = Category::Follow;
    const ADD_TYPE: MessageType = MessageType::FollowAdd;
    const REMOVE_TYPE: Option<MessageType> = Some(MessageType::FollowRemove);
    const RULE: ConflictRule = ConflictRule::LastWriteWins;

    fn key(message: &Message) -> StoreResult<Fid> {
        match message.body() {
            MessageBody::Follow(body) => Ok(body.target_fid),
            _ => Err(StoreError::InvalidMessage(format!("{} has no follow body", message))),
        }
    }
}

pub type FollowStore = MessageSet<FollowKind>;

impl MessageSet<FollowKind> {
    pub async fn get_follow_add(&self, fid: Fid, target: Fid) -> StoreResult<Message> {
        self.get_add(fid, &target).await
    }

    pub async fn get_follow_remove(&self, fid: Fid, target: Fid) -> StoreResult<Message> {
        self.get_remove(fid, &target).await
    }

    /// Live follows pointing at `target`
    pub async fn get_follows_by_target(&self, target: Fid) -> Vec<Message> {
        self.scan_adds(|key, _| *key == target).await
    }
}
