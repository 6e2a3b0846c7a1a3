/*
    query.rs - Read-only query surface

    Accessors take raw arguments (integers, byte slices, strings) as they
    arrive from a caller and check them before touching any store; a bad
    argument is a Request error. A missing single entity is a NotFound store
    error, while an empty listing is an empty vector.
*/

use super::errors::{HubError, HubResult};
use crate::core_message::validation::validate_fname;
use crate::core_message::{
    Address, CastId, Fid, IdRegistryEvent, Message, MessageHash, NameRegistryEvent, ReactionType, SignerKey,
    UserDataType,
};
use crate::core_store::{MessageStore, NodeState, NodeStateRecord, Stores};
use crate::metrics::MetricsCollector;
use std::sync::Arc;

fn parse_fid(value: u64) -> HubResult<Fid> {
    Fid::new(value).map_err(|_| HubError::request("fid must be greater than 0"))
}

fn parse_hash(bytes: &[u8]) -> HubResult<MessageHash> {
    MessageHash::try_from(bytes).map_err(|e| HubError::request(e.to_string()))
}

fn parse_cast_id(fid: u64, hash: &[u8]) -> HubResult<CastId> {
    Ok(CastId::new(parse_fid(fid)?, parse_hash(hash)?))
}

fn parse_address(bytes: &[u8]) -> HubResult<Address> {
    Address::try_from(bytes).map_err(|e| HubError::request(e.to_string()))
}

fn parse_signer_key(bytes: &[u8]) -> HubResult<SignerKey> {
    SignerKey::try_from(bytes).map_err(|e| HubError::request(e.to_string()))
}

pub struct QuerySurface {
    stores: Arc<Stores>,
    node_state: NodeStateRecord,
    metrics: Arc<MetricsCollector>,
}

impl QuerySurface {
    pub fn new(stores: Arc<Stores>, node_state: NodeStateRecord, metrics: Arc<MetricsCollector>) -> Self {
        QuerySurface { stores, node_state, metrics }
    }

    fn fid(&self, value: u64) -> HubResult<Fid> {
        self.metrics.record_query();
        parse_fid(value)
    }

    // Casts

    pub async fn get_cast(&self, fid: u64, hash: &[u8]) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        let hash = parse_hash(hash)?;
        Ok(self.stores.cast.get_cast_add(fid, hash).await?)
    }

    pub async fn get_casts_by_user(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.cast.get_adds_by_fid(fid).await?)
    }

    pub async fn get_casts_by_parent(&self, parent_fid: u64, parent_hash: &[u8]) -> HubResult<Vec<Message>> {
        self.metrics.record_query();
        let parent = parse_cast_id(parent_fid, parent_hash)?;
        Ok(self.stores.cast.get_casts_by_parent(&parent).await)
    }

    pub async fn get_casts_by_mention(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.cast.get_casts_by_mention(fid).await)
    }

    pub async fn get_all_cast_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.cast.get_all_messages_by_fid(fid).await?)
    }

    // Follows

    pub async fn get_follow(&self, fid: u64, target_fid: u64) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        let target = parse_fid(target_fid)?;
        Ok(self.stores.follow.get_follow_add(fid, target).await?)
    }

    pub async fn get_follows_by_user(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.follow.get_adds_by_fid(fid).await?)
    }

    pub async fn get_followers(&self, target_fid: u64) -> HubResult<Vec<Message>> {
        let target = self.fid(target_fid)?;
        Ok(self.stores.follow.get_follows_by_target(target).await)
    }

    pub async fn get_all_follow_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.follow.get_all_messages_by_fid(fid).await?)
    }

    // Reactions

    pub async fn get_reaction(
        &self,
        fid: u64,
        reaction_type: ReactionType,
        cast_fid: u64,
        cast_hash: &[u8],
    ) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        let target = parse_cast_id(cast_fid, cast_hash)?;
        Ok(self.stores.reaction.get_reaction_add(fid, reaction_type, target).await?)
    }

    pub async fn get_reactions_by_user(&self, fid: u64, reaction_type: Option<ReactionType>) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.reaction.get_reaction_adds_by_fid(fid, reaction_type).await)
    }

    pub async fn get_reactions_by_cast(
        &self,
        cast_fid: u64,
        cast_hash: &[u8],
        reaction_type: Option<ReactionType>,
    ) -> HubResult<Vec<Message>> {
        self.metrics.record_query();
        let target = parse_cast_id(cast_fid, cast_hash)?;
        Ok(self.stores.reaction.get_reactions_by_target(&target, reaction_type).await)
    }

    pub async fn get_all_reaction_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.reaction.get_all_messages_by_fid(fid).await?)
    }

    // Verifications

    pub async fn get_verification(&self, fid: u64, address: &[u8]) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        let address = parse_address(address)?;
        Ok(self.stores.verification.get_verification_add(fid, address).await?)
    }

    pub async fn get_verifications_by_user(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.verification.get_adds_by_fid(fid).await?)
    }

    pub async fn get_all_verification_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.verification.get_all_messages_by_fid(fid).await?)
    }

    // Signers and custody

    pub async fn get_signer(&self, fid: u64, signer: &[u8]) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        let key = parse_signer_key(signer)?;
        Ok(self.stores.signer.get_signer_add(fid, key).await?)
    }

    pub async fn get_signers_by_user(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.signer.get_adds_by_fid(fid).await?)
    }

    pub async fn get_all_signer_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.signer.get_all_messages_by_fid(fid).await?)
    }

    pub async fn get_custody_event(&self, fid: u64) -> HubResult<IdRegistryEvent> {
        let fid = self.fid(fid)?;
        Ok(self.stores.signer.get_custody_event(fid).await?)
    }

    /// Every account with a custody event, ascending
    pub async fn get_fids(&self) -> HubResult<Vec<Fid>> {
        self.metrics.record_query();
        Ok(self.stores.signer.get_fids().await)
    }

    // User data

    pub async fn get_user_data(&self, fid: u64, user_data_type: UserDataType) -> HubResult<Message> {
        let fid = self.fid(fid)?;
        Ok(self.stores.user_data.get_user_data_add(fid, user_data_type).await?)
    }

    pub async fn get_user_data_by_user(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.user_data.get_adds_by_fid(fid).await?)
    }

    pub async fn get_all_user_data_messages_by_fid(&self, fid: u64) -> HubResult<Vec<Message>> {
        let fid = self.fid(fid)?;
        Ok(self.stores.user_data.get_all_messages_by_fid(fid).await?)
    }

    pub async fn get_name_registry_event(&self, fname: &str) -> HubResult<NameRegistryEvent> {
        self.metrics.record_query();
        validate_fname(fname).map_err(|e| HubError::request(e.to_string()))?;
        Ok(self.stores.user_data.get_name_registry_event(fname).await?)
    }

    // Node state

    pub async fn get_node_state(&self) -> HubResult<NodeState> {
        Ok(self.node_state.get().await?)
    }

    /// Read-modify-write of the node state record; concurrent updates can
    /// overwrite each other
    pub async fn update_node_state<F>(&self, update: F) -> HubResult<NodeState>
    where
        F: FnOnce(&mut NodeState) + Send,
    {
        Ok(self.node_state.update(update).await?)
    }
}
