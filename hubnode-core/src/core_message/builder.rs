/*
    builder.rs - Construct and sign messages

    Messages are normally produced off-node by clients; the builder exists
    so tools and tests can produce correctly hashed and signed messages.

    Example:
        let message = MessageBuilder::new(fid)
            .network(Network::Devnet)
            .cast_add("hello")
            .sign(&signing_key)?;
*/

use super::errors::{ValidationError, ValidationResult};
use super::eth::{self, CustodySigningKey};
use super::message::{
    CastAddBody, CastRemoveBody, FollowBody, Message, MessageBody, MessageData, MessageType,
    Network, ReactionBody, ReactionType, SignerBody, UserDataBody, UserDataType,
    VerificationAddBody, VerificationClaim, VerificationRemoveBody,
};
use super::time::farcaster_time_now;
use super::types::{Address, CastId, Fid, MessageHash, Signer, SignerKey};
use ed25519_dalek::{Signer as _, SigningKey};

/// Builder for signed messages
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    fid: Fid,
    network: Network,
    timestamp: Option<u32>,
    message_type: MessageType,
    body: Option<MessageBody>,
}

impl MessageBuilder {
    pub fn new(fid: Fid) -> Self {
        MessageBuilder {
            fid,
            network: Network::Mainnet,
            timestamp: None,
            message_type: MessageType::None,
            body: None,
        }
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Farcaster time; defaults to now
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set an arbitrary type and body, including mismatched pairs
    pub fn body(mut self, message_type: MessageType, body: MessageBody) -> Self {
        self.message_type = message_type;
        self.body = Some(body);
        self
    }

    pub fn cast_add(self, text: impl Into<String>) -> Self {
        self.body(MessageType::CastAdd, MessageBody::CastAdd(CastAddBody::text(text)))
    }

    pub fn cast_reply(self, text: impl Into<String>, parent: CastId) -> Self {
        let body = CastAddBody { parent: Some(parent), ..CastAddBody::text(text) };
        self.body(MessageType::CastAdd, MessageBody::CastAdd(body))
    }

    pub fn cast_with_mentions(self, text: impl Into<String>, mentions: Vec<(Fid, u32)>) -> Self {
        let (mentions, mentions_positions) = mentions.into_iter().unzip();
        let body = CastAddBody { mentions, mentions_positions, ..CastAddBody::text(text) };
        self.body(MessageType::CastAdd, MessageBody::CastAdd(body))
    }

    pub fn cast_remove(self, target_hash: MessageHash) -> Self {
        self.body(MessageType::CastRemove, MessageBody::CastRemove(CastRemoveBody { target_hash }))
    }

    pub fn reaction_add(self, reaction_type: ReactionType, target: CastId) -> Self {
        self.body(MessageType::ReactionAdd, MessageBody::Reaction(ReactionBody { reaction_type, target }))
    }

    pub fn reaction_remove(self, reaction_type: ReactionType, target: CastId) -> Self {
        self.body(
            MessageType::ReactionRemove,
            MessageBody::Reaction(ReactionBody { reaction_type, target }),
        )
    }

    pub fn follow_add(self, target_fid: Fid) -> Self {
        self.body(MessageType::FollowAdd, MessageBody::Follow(FollowBody { target_fid }))
    }

    pub fn follow_remove(self, target_fid: Fid) -> Self {
        self.body(MessageType::FollowRemove, MessageBody::Follow(FollowBody { target_fid }))
    }

    /// Verification claim for the address of `eth_key`, signed by that key
    pub fn verification_add(
        self,
        eth_key: &CustodySigningKey,
        block_hash: Vec<u8>,
    ) -> ValidationResult<Self> {
        let address = eth::custody_address(eth_key);
        let claim = VerificationClaim {
            fid: self.fid,
            address,
            network: self.network,
            block_hash: block_hash.clone(),
        };
        let eth_signature = eth::sign_eip191(eth_key, &claim.encode()?)?;
        let body = VerificationAddBody { address, eth_signature, block_hash };
        Ok(self.body(MessageType::VerificationAddEthAddress, MessageBody::VerificationAdd(body)))
    }

    pub fn verification_remove(self, address: Address) -> Self {
        self.body(
            MessageType::VerificationRemove,
            MessageBody::VerificationRemove(VerificationRemoveBody { address }),
        )
    }

    pub fn signer_add(self, signer: SignerKey) -> Self {
        self.body(MessageType::SignerAdd, MessageBody::Signer(SignerBody { signer }))
    }

    pub fn signer_remove(self, signer: SignerKey) -> Self {
        self.body(MessageType::SignerRemove, MessageBody::Signer(SignerBody { signer }))
    }

    pub fn user_data(self, user_data_type: UserDataType, value: impl Into<String>) -> Self {
        let body = UserDataBody { user_data_type, value: value.into() };
        self.body(MessageType::UserDataAdd, MessageBody::UserData(body))
    }

    fn into_data(self) -> ValidationResult<MessageData> {
        let body = self
            .body
            .ok_or_else(|| ValidationError::BodyMismatch(self.message_type.to_string()))?;
        Ok(MessageData {
            message_type: self.message_type,
            fid: self.fid,
            timestamp: self.timestamp.unwrap_or_else(farcaster_time_now),
            network: self.network,
            body,
        })
    }

    /// Sign with a delegated Ed25519 signer key
    pub fn sign(self, key: &SigningKey) -> ValidationResult<Message> {
        let data = self.into_data()?;
        let hash = data.hash()?;
        let signature = key.sign(hash.as_bytes()).to_bytes().to_vec();
        let signer = Signer::Key(SignerKey::from_array(key.verifying_key().to_bytes()));
        Ok(Message { data, hash, signature, signer })
    }

    /// Sign with the custody key (EIP-191)
    pub fn sign_custody(self, key: &CustodySigningKey) -> ValidationResult<Message> {
        let data = self.into_data()?;
        let hash = data.hash()?;
        let signature = eth::sign_eip191(key, hash.as_bytes())?;
        let signer = Signer::Custody(eth::custody_address(key));
        Ok(Message { data, hash, signature, signer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_body_rejected() {
        let key = SigningKey::from_bytes(&[1u8; 32]);
        let result = MessageBuilder::new(Fid::new(1).unwrap()).sign(&key);
        assert!(matches!(result, Err(ValidationError::BodyMismatch(_))));
    }

    #[test]
    fn test_sign_sets_signer_and_hash() {
        let key = SigningKey::from_bytes(&[1u8; 32]);
        let message = MessageBuilder::new(Fid::new(1).unwrap())
            .timestamp(42)
            .follow_add(Fid::new(2).unwrap())
            .sign(&key)
            .unwrap();

        assert_eq!(message.timestamp(), 42);
        assert_eq!(message.hash, message.data.hash().unwrap());
        assert_eq!(message.signer, Signer::Key(SignerKey::from_array(key.verifying_key().to_bytes())));
    }

    #[test]
    fn test_custody_signature_names_address() {
        let key = CustodySigningKey::from_slice(&[2u8; 32]).unwrap();
        let message = MessageBuilder::new(Fid::new(1).unwrap())
            .signer_add(SignerKey::from_array([5; 32]))
            .sign_custody(&key)
            .unwrap();

        assert_eq!(message.signer, Signer::Custody(eth::custody_address(&key)));
    }
}
