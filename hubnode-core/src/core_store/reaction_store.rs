/*
    reaction_store.rs - Likes and recasts

    Keyed by (reaction type, target cast), last-write-wins.
*/

use super::errors::{StoreError, StoreResult};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use crate::core_message::{CastId, Category, Fid, Message, MessageBody, MessageType, ReactionType};

pub struct ReactionKind;

impl SetKind for ReactionKind {
    type Key = (ReactionType, CastId);

    const CATEGORY: Category = Category::Reaction;
    const ADD_TYPE: MessageType = MessageType::ReactionAdd;
    const REMOVE_TYPE: Option<MessageType> = Some(MessageType::ReactionRemove);
    const RULE: ConflictRule = ConflictRule::LastWriteWins;

    fn key(message: &Message) -> StoreResult<(ReactionType, CastId)> {
        match message.body() {
            MessageBody::Reaction(body) => Ok((body.reaction_type, body.target)),
            _ => Err(StoreError::InvalidMessage(format!("{} has no reaction body", message))),
        }
    }
}

pub type ReactionStore = MessageSet<ReactionKind>;

impl MessageSet<ReactionKind> {
    pub async fn get_reaction_add(
        &self,
        fid: Fid,
        reaction_type: ReactionType,
        target: CastId,
    ) -> StoreResult<Message> {
        self.get_add(fid, &(reaction_type, target)).await
    }

    pub async fn get_reaction_remove(
        &self,
        fid: Fid,
        reaction_type: ReactionType,
        target: CastId,
    ) -> StoreResult<Message> {
        self.get_remove(fid, &(reaction_type, target)).await
    }

    /// Live reactions of an account, optionally of one type
    pub async fn get_reaction_adds_by_fid(&self, fid: Fid, reaction_type: Option<ReactionType>) -> Vec<Message> {
        self.adds_by_fid_where(fid, |(kind, _)| reaction_type.map_or(true, |t| t == *kind)).await
    }

    /// Live reactions on a cast, optionally of one type
    pub async fn get_reactions_by_target(&self, target: &CastId, reaction_type: Option<ReactionType>) -> Vec<Message> {
        self.scan_adds(|(kind, cast), _| cast == target && reaction_type.map_or(true, |t| t == *kind))
            .await
    }
}
