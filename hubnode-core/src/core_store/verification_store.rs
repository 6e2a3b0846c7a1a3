/*
    verification_store.rs - Verified Ethereum addresses

    Keyed by verified address, last-write-wins.
*/

use super::errors::{StoreError, StoreResult};
use super::message_set::{ConflictRule, MessageSet, SetKind};
use crate::core_message::{Address, Category, Fid, Message, MessageBody, MessageType};

pub struct VerificationKind;

impl SetKind for VerificationKind {
    type Key = Address;

    const CATEGORY: Category = Category::Verification;
    const ADD_TYPE: MessageType = MessageType::VerificationAddEthAddress;
    const REMOVE_TYPE: Option<MessageType> = Some(MessageType::VerificationRemove);
    const RULE: ConflictRule = ConflictRule::LastWriteWins;

    fn key(message: &Message) -> StoreResult<Address> {
        match message.body() {
            MessageBody::VerificationAdd(body) => Ok(body.address),
            MessageBody::VerificationRemove(body) => Ok(body.address),
            _ => Err(StoreError::InvalidMessage(format!("{} has no verification body", message))),
        }
    }
}

pub type VerificationStore = MessageSet<VerificationKind>;

impl MessageSet<VerificationKind> {
    pub async fn get_verification_add(&self, fid: Fid, address: Address) -> StoreResult<Message> {
        self.get_add(fid, &address).await
    }

    pub async fn get_verification_remove(&self, fid: Fid, address: Address) -> StoreResult<Message> {
        self.get_remove(fid, &address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_message::eth::custody_address;
    use crate::core_store::test_support::{builder, custody_key, fid, key_a, RecordingSink};
    use crate::core_store::MessageStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_verify_then_unverify() {
        let store = VerificationStore::new(Arc::new(RecordingSink::default()));
        let eth_key = custody_key(4);
        let address = custody_address(&eth_key);

        let add = builder(1, 100)
            .verification_add(&eth_key, vec![0; 32])
            .unwrap()
            .sign(&key_a())
            .unwrap();
        let remove = builder(1, 101).verification_remove(address).sign(&key_a()).unwrap();

        store.merge(&add).await.unwrap();
        assert_eq!(store.get_verification_add(fid(1), address).await.unwrap(), add);

        store.merge(&remove).await.unwrap();
        assert!(store.get_verification_add(fid(1), address).await.is_err());
        assert_eq!(store.get_all_messages_by_fid(fid(1)).await.unwrap(), vec![remove]);
    }
}
