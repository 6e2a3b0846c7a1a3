/*
    message.rs - Signed protocol messages

    A message is immutable once created: the hash covers the canonical
    encoding of its data and the signature covers the hash. Stores never
    rewrite messages, they only keep, displace, or revoke them.

    Canonical encoding is bincode of `MessageData`; it exists for hashing
    and signing only.
*/

use super::errors::{ValidationError, ValidationResult};
use super::types::{Address, CastId, Fid, MessageHash, Signer, SignerKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network a message was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" => Some(Network::Mainnet),
            "testnet" => Some(Network::Testnet),
            "devnet" => Some(Network::Devnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data category, one per store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Cast,
    Follow,
    Reaction,
    Signer,
    Verification,
    UserData,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cast,
        Category::Follow,
        Category::Reaction,
        Category::Signer,
        Category::Verification,
        Category::UserData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cast => "cast",
            Category::Follow => "follow",
            Category::Reaction => "reaction",
            Category::Signer => "signer",
            Category::Verification => "verification",
            Category::UserData => "user_data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared message type
///
/// `None` is the zero value of an unset type; it has no category and is
/// refused before any store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    None,
    CastAdd,
    CastRemove,
    ReactionAdd,
    ReactionRemove,
    FollowAdd,
    FollowRemove,
    VerificationAddEthAddress,
    VerificationRemove,
    SignerAdd,
    SignerRemove,
    UserDataAdd,
}

impl MessageType {
    pub fn category(&self) -> Option<Category> {
        match self {
            MessageType::None => None,
            MessageType::CastAdd | MessageType::CastRemove => Some(Category::Cast),
            MessageType::ReactionAdd | MessageType::ReactionRemove => Some(Category::Reaction),
            MessageType::FollowAdd | MessageType::FollowRemove => Some(Category::Follow),
            MessageType::VerificationAddEthAddress | MessageType::VerificationRemove => {
                Some(Category::Verification)
            }
            MessageType::SignerAdd | MessageType::SignerRemove => Some(Category::Signer),
            MessageType::UserDataAdd => Some(Category::UserData),
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(
            self,
            MessageType::CastRemove
                | MessageType::ReactionRemove
                | MessageType::FollowRemove
                | MessageType::VerificationRemove
                | MessageType::SignerRemove
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    Like,
    Recast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserDataType {
    Pfp,
    Display,
    Bio,
    Url,
    Fname,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAddBody {
    pub text: String,
    pub embeds: Vec<String>,
    pub mentions: Vec<Fid>,
    /// Byte offsets into `text` where each mention is rendered
    pub mentions_positions: Vec<u32>,
    pub parent: Option<CastId>,
}

impl CastAddBody {
    pub fn text(text: impl Into<String>) -> Self {
        CastAddBody {
            text: text.into(),
            embeds: Vec::new(),
            mentions: Vec::new(),
            mentions_positions: Vec::new(),
            parent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRemoveBody {
    pub target_hash: MessageHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionBody {
    pub reaction_type: ReactionType,
    pub target: CastId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowBody {
    pub target_fid: Fid,
}

/// Claim that `address` belongs to the account, signed by that address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAddBody {
    pub address: Address,
    pub eth_signature: Vec<u8>,
    pub block_hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRemoveBody {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerBody {
    pub signer: SignerKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataBody {
    pub user_data_type: UserDataType,
    pub value: String,
}

/// Payload the verified address signs in a verification claim
#[derive(Debug, Clone, Serialize)]
pub struct VerificationClaim {
    pub fid: Fid,
    pub address: Address,
    pub network: Network,
    pub block_hash: Vec<u8>,
}

impl VerificationClaim {
    pub fn encode(&self) -> ValidationResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    CastAdd(CastAddBody),
    CastRemove(CastRemoveBody),
    Reaction(ReactionBody),
    Follow(FollowBody),
    VerificationAdd(VerificationAddBody),
    VerificationRemove(VerificationRemoveBody),
    Signer(SignerBody),
    UserData(UserDataBody),
}

impl MessageBody {
    /// Whether this body shape is the one `message_type` requires
    pub fn fits(&self, message_type: MessageType) -> bool {
        matches!(
            (message_type, self),
            (MessageType::CastAdd, MessageBody::CastAdd(_))
                | (MessageType::CastRemove, MessageBody::CastRemove(_))
                | (MessageType::ReactionAdd | MessageType::ReactionRemove, MessageBody::Reaction(_))
                | (MessageType::FollowAdd | MessageType::FollowRemove, MessageBody::Follow(_))
                | (MessageType::VerificationAddEthAddress, MessageBody::VerificationAdd(_))
                | (MessageType::VerificationRemove, MessageBody::VerificationRemove(_))
                | (MessageType::SignerAdd | MessageType::SignerRemove, MessageBody::Signer(_))
                | (MessageType::UserDataAdd, MessageBody::UserData(_))
        )
    }
}

/// The signed part of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub message_type: MessageType,
    pub fid: Fid,
    /// Farcaster time, seconds
    pub timestamp: u32,
    pub network: Network,
    pub body: MessageBody,
}

impl MessageData {
    /// Canonical bytes covered by the hash
    pub fn encode(&self) -> ValidationResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn hash(&self) -> ValidationResult<MessageHash> {
        Ok(MessageHash::digest(&self.encode()?))
    }
}

/// A signed, immutable protocol message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub data: MessageData,
    pub hash: MessageHash,
    pub signature: Vec<u8>,
    pub signer: Signer,
}

impl Message {
    pub fn fid(&self) -> Fid {
        self.data.fid
    }

    pub fn message_type(&self) -> MessageType {
        self.data.message_type
    }

    pub fn category(&self) -> Option<Category> {
        self.data.message_type.category()
    }

    pub fn timestamp(&self) -> u32 {
        self.data.timestamp
    }

    pub fn hash(&self) -> &MessageHash {
        &self.hash
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn body(&self) -> &MessageBody {
        &self.data.body
    }

    pub fn cast_id(&self) -> CastId {
        CastId::new(self.fid(), self.hash)
    }

    /// Fname this message claims, if it is a non-empty fname user data add
    pub fn fname_claim(&self) -> Option<&str> {
        match (&self.data.message_type, &self.data.body) {
            (MessageType::UserDataAdd, MessageBody::UserData(body))
                if body.user_data_type == UserDataType::Fname && !body.value.is_empty() =>
            {
                Some(body.value.as_str())
            }
            _ => None,
        }
    }

    /// Signer key a Signer Remove message de-authorizes
    pub fn removed_signer(&self) -> Option<SignerKey> {
        match (&self.data.message_type, &self.data.body) {
            (MessageType::SignerRemove, MessageBody::Signer(body)) => Some(body.signer),
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[fid={} hash={}]", self.data.message_type, self.data.fid, self.hash)
    }
}

/// Helper for rejecting a body/type combination
pub(crate) fn body_mismatch(message_type: MessageType) -> ValidationError {
    ValidationError::BodyMismatch(message_type.to_string())
}
