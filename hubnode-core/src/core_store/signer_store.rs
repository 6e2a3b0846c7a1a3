/*
    signer_store.rs - Delegated signer keys and custody events

    Signer messages are signed by a custody address, so each entry is keyed
    by (custody address, signer key). Only entries written by the account's
    current custody address are considered active; entries left behind by an
    earlier custody address stay in the set until revoked.

    The store also owns the latest custody event per fid, which is the only
    source of truth for "who controls this account".
*/

use super::errors::{StoreError, StoreResult};
use super::events::{EventSink, HubEvent};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use super::traits::{MergeOutcome, MessageStore};
use crate::core_message::{
    Address, Category, Fid, IdRegistryEvent, Message, MessageBody, MessageType, Signer, SignerKey,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct SignerKind;

impl SetKind for SignerKind {
    type Key = (Address, SignerKey);

    const CATEGORY: Category = Category::Signer;
    const ADD_TYPE: MessageType = MessageType::SignerAdd;
    const REMOVE_TYPE: Option<MessageType> = Some(MessageType::SignerRemove);
    const RULE: ConflictRule = ConflictRule::LastWriteWins;

    fn key(message: &Message) -> StoreResult<(Address, SignerKey)> {
        let custody = match message.signer() {
            Signer::Custody(address) => *address,
            Signer::Key(_) => {
                return Err(StoreError::InvalidMessage(format!("{} is not custody-signed", message)))
            }
        };
        match message.body() {
            MessageBody::Signer(body) => Ok((custody, body.signer)),
            _ => Err(StoreError::InvalidMessage(format!("{} has no signer body", message))),
        }
    }
}

/// Result of applying a custody event
#[derive(Debug, Clone, PartialEq)]
pub enum CustodyUpdate {
    /// Event is now the current custody record
    Applied { previous: Option<IdRegistryEvent> },

    /// A newer or identical event is already stored
    Stale,
}

pub struct SignerStore {
    signers: MessageSet<SignerKind>,
    custody: RwLock<BTreeMap<Fid, IdRegistryEvent>>,
    sink: Arc<dyn EventSink>,
}

impl SignerStore {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        SignerStore { signers: MessageSet::new(sink.clone()), custody: RwLock::new(BTreeMap::new()), sink }
    }

    /// Record a custody event if it is newer than the stored one
    pub async fn apply_custody_event(&self, event: &IdRegistryEvent) -> StoreResult<CustodyUpdate> {
        let previous = {
            let mut custody = self.custody.write().await;
            if let Some(current) = custody.get(&event.fid) {
                if current.position() >= event.position() {
                    debug!(fid = %event.fid, block = event.block_number, "stale custody event");
                    return Ok(CustodyUpdate::Stale);
                }
            }
            custody.insert(event.fid, event.clone())
        };

        info!(
            fid = %event.fid,
            custody = %event.to,
            event_type = %event.event_type,
            block = event.block_number,
            "custody event applied"
        );
        self.sink.reflect(HubEvent::MergeIdRegistryEvent { event: event.clone() });
        Ok(CustodyUpdate::Applied { previous })
    }

    pub async fn get_custody_event(&self, fid: Fid) -> StoreResult<IdRegistryEvent> {
        let custody = self.custody.read().await;
        custody
            .get(&fid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("custody event for fid {}", fid)))
    }

    pub async fn get_custody_address(&self, fid: Fid) -> StoreResult<Address> {
        Ok(self.get_custody_event(fid).await?.to)
    }

    /// Every fid with a custody event, ascending
    pub async fn get_fids(&self) -> Vec<Fid> {
        self.custody.read().await.keys().copied().collect()
    }

    /// Signer keys currently authorized for `fid`
    pub async fn get_active_signers(&self, fid: Fid) -> StoreResult<Vec<SignerKey>> {
        let custody = self.get_custody_address(fid).await?;
        Ok(self.get_signer_keys_by_custody(fid, custody).await)
    }

    /// Keys added for `fid` by a given custody address, active or not
    pub async fn get_signer_keys_by_custody(&self, fid: Fid, custody: Address) -> Vec<SignerKey> {
        self.signers
            .adds_by_fid_where(fid, |(address, _)| *address == custody)
            .await
            .iter()
            .filter_map(|message| match message.body() {
                MessageBody::Signer(body) => Some(body.signer),
                _ => None,
            })
            .collect()
    }

    pub async fn get_signer_add(&self, fid: Fid, signer: SignerKey) -> StoreResult<Message> {
        let custody = self.get_custody_address(fid).await?;
        self.signers.get_add(fid, &(custody, signer)).await
    }

    pub async fn get_signer_remove(&self, fid: Fid, signer: SignerKey) -> StoreResult<Message> {
        let custody = self.get_custody_address(fid).await?;
        self.signers.get_remove(fid, &(custody, signer)).await
    }

    async fn current_custody(&self, fid: Fid) -> Option<Address> {
        self.custody.read().await.get(&fid).map(|event| event.to)
    }
}

#[async_trait]
impl MessageStore for SignerStore {
    fn category(&self) -> Category {
        Category::Signer
    }

    async fn merge(&self, message: &Message) -> StoreResult<MergeOutcome> {
        self.signers.merge(message).await
    }

    async fn revoke_by_signer(&self, fid: Fid, signer: &Signer) -> StoreResult<Vec<Message>> {
        self.signers.revoke_by_signer(fid, signer).await
    }

    /// Adds written by the current custody address
    async fn get_adds_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        match self.current_custody(fid).await {
            Some(custody) => Ok(self.signers.adds_by_fid_where(fid, |(address, _)| *address == custody).await),
            None => Ok(Vec::new()),
        }
    }

    async fn get_removes_by_fid(&self, fid: Fid) -> StoreResult<Vec<Message>> {
        match self.current_custody(fid).await {
            Some(custody) => Ok(self
                .signers
                .get_removes_by_fid(fid)
                .await?
                .into_iter()
                .filter(|message| *message.signer() == Signer::Custody(custody))
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}
