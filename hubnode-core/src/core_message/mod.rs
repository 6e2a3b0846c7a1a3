/*
    core_message - Protocol messages and registry events

    Handles:
    - Identifier types (fid, address, signer key, hash)
    - The signed message model and its canonical encoding
    - Decoded custody and name registry events
    - Stateless schema and signature validation
    - Building and signing messages
*/

pub mod builder;
pub mod errors;
pub mod eth;
pub mod events;
pub mod message;
pub mod time;
pub mod types;
pub mod validation;

pub use builder::MessageBuilder;
pub use errors::{ValidationError, ValidationResult};
pub use eth::CustodySigningKey;
pub use events::{IdRegistryEvent, IdRegistryEventType, NameRegistryEvent, NameRegistryEventType};
pub use message::{
    CastAddBody, CastRemoveBody, Category, FollowBody, Message, MessageBody, MessageData,
    MessageType, Network, ReactionBody, ReactionType, SignerBody, UserDataBody, UserDataType,
    VerificationAddBody, VerificationRemoveBody,
};
pub use time::{farcaster_time_now, FARCASTER_EPOCH};
pub use types::{Address, CastId, Fid, MessageHash, Signer, SignerKey};
pub use validation::{MessageValidator, ValidationRules};
