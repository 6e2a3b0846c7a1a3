/*
    user_data_store.rs - Profile fields and name registry events

    One entry per (fid, user data type), last-write-wins. There is no remove
    message; a field is cleared by writing an empty value.

    Name registry events are kept here as well, keyed by fname, because the
    fname user data field is the only consumer.
*/

use super::errors::{StoreError, StoreResult};
use super::events::{EventSink, HubEvent};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use super::traits::{MergeOutcome, MessageStore};
use crate::core_message::{
    Category, Fid, Message, MessageBody, MessageType, NameRegistryEvent, Signer, UserDataType,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct UserDataKind;

impl SetKind for UserDataKind {
    type Key = UserDataType;

    const CATEGORY: Category = Category::UserData;
    const ADD_TYPE: MessageType = MessageType::UserDataAdd;
    const REMOVE_TYPE: Option<MessageType> = None;
    const RULE: ConflictRule = ConflictRule::LastWriteWins;

    fn key(message: &Message) -> StoreResult<UserDataType> {
        match message.body() {
            MessageBody::UserData(body) => Ok(body.user_data_type),
            _ => Err(StoreError::InvalidMessage(format!("{} has no user data body", message))),
        }
    }
}

/// Result of applying a name registry event
#[derive(Debug, Clone, PartialEq)]
pub enum NameUpdate {
    Applied { previous: Option<NameRegistryEvent> },
    Stale,
}

pub struct UserDataStore {
    user_data: MessageSet<UserDataKind>,
    names: RwLock<BTreeMap<String, NameRegistryEvent>>,
    sink: Arc<dyn EventSink>,
}

impl UserDataStore {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        UserDataStore { user_data: MessageSet::new(sink.clone()), names: RwLock::new(BTreeMap::new()), sink }
    }

    /// Record a name event if it is newer than the stored one for its fname
    pub async fn apply_name_event(&self, event: &NameRegistryEvent) -> StoreResult<NameUpdate> {
        let previous = {
            let mut names = self.names.write().await;
            if let Some(current) = names.get(&event.fname) {
                if current.position() >= event.position() {
                    debug!(fname = %event.fname, block = event.block_number, "stale name event");
                    return Ok(NameUpdate::Stale);
                }
            }
            names.insert(event.fname.clone(), event.clone())
        };

        info!(fname = %event.fname, to = %event.to, event_type = %event.event_type, "name event applied");
        self.sink.reflect(HubEvent::MergeNameRegistryEvent { event: event.clone() });
        Ok(NameUpdate::Applied { previous })
    }

    pub async fn get_name_registry_event(&self, fname: &str) -> StoreResult<NameRegistryEvent> {
        let names = self.names.read().await;
        names
            .get(fname)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("name registry event for {}", fname)))
    }

    pub async fn get_user_data_add(&self, fid: Fid, user_data_type: UserDataType) -> StoreResult<Message> {
        self.user_data.get_add(fid, &user_data_type).await
    }
}

#[async_trait]
impl MessageStore for UserDataStore {
    fn category(&self) -> Category {
        Category::UserData
    }

    async fn merge(&self, message: &Message) -> StoreResult<MergeOutcome> {
        self.user_data.merge(message).await
    }

    async fn revoke_by_signer(&self, fid: Fid, signer: &Signer) -> StoreResult<Vec<Message>> {
        self.user_data.revoke_by_signer(fid, signer).await
    }

    async fn get_adds_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        self.user_data.get_adds_by_fid(fid).await
    }

    async fn get_removes_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        self.user_data.get_removes_by_fid(fid).await
    }
}
