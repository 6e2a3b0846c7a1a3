//! Engine test helpers

use crate::core_engine::Engine;
use crate::core_message::{Category, Fid, Message};
use crate::core_store::{MergeOutcome, MessageStore};
use crate::test_utils::{TestAccount, TEST_NETWORK};

pub const SOURCE: &str = "test";

pub fn fid(n: u64) -> Fid {
    Fid::new(n).unwrap()
}

pub fn account(n: u64) -> TestAccount {
    TestAccount::new(n).unwrap()
}

pub fn engine() -> Engine {
    Engine::in_memory(TEST_NETWORK)
}

/// Register `account` and grant its default signer key
pub async fn register(engine: &Engine, account: &TestAccount) {
    engine.apply_custody_event(&account.register_event(1), SOURCE).await.unwrap();
    let add = account.signer_add(account.signer_key(), 10).unwrap();
    assert!(engine.merge_message(&add, SOURCE).await.unwrap().is_merged());
}

/// Engine with one registered account
pub async fn engine_with(n: u64) -> (Engine, TestAccount) {
    let engine = engine();
    let account = account(n);
    register(&engine, &account).await;
    (engine, account)
}

pub async fn merge(engine: &Engine, message: &Message) -> MergeOutcome {
    engine.merge_message(message, SOURCE).await.unwrap()
}

/// Every stored message of `fid`, per category
pub async fn state_of(engine: &Engine, fid: Fid) -> Vec<(Category, Vec<Message>)> {
    let mut state = Vec::new();
    for category in Category::ALL {
        let messages = engine.stores().store_for(category).get_all_messages_by_fid(fid).await.unwrap();
        state.push((category, messages));
    }
    state
}
