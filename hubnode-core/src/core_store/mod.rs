/*
    core_store - Per-category CRDT stores

    Handles:
    - Merging validated messages under each category's conflict rule
    - Revoking everything a signer produced
    - Custody and name registry events
    - Change events for every committed state change
    - Transactional key-value engine and node state
*/

pub mod cast_store;
pub mod errors;
pub mod events;
pub mod follow_store;
pub mod kv;
pub mod message_set;
pub mod node_state;
pub mod reaction_store;
pub mod signer_store;
pub mod stores;
pub mod traits;
pub mod user_data_store;
pub mod verification_store;

#[cfg(test)]
pub mod test_support;

pub use cast_store::CastStore;
pub use errors::{StoreError, StoreResult};
pub use events::{EventSink, HubEvent};
pub use follow_store::FollowStore;
pub use kv::{KvEngine, KvOp, KvTransaction, LogKv, MemoryKv};
pub use message_set::{ConflictRule, MessageSet, SetKind};
pub use node_state::{NodeState, NodeStateRecord};
pub use reaction_store::ReactionStore;
pub use signer_store::{CustodyUpdate, SignerStore};
pub use stores::Stores;
pub use traits::{MergeOutcome, MessageStore};
pub use user_data_store::{NameUpdate, UserDataStore};
pub use verification_store::VerificationStore;
