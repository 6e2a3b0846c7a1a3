//! Order-independence of merged state
//!
//! Any delivery order of the same messages, with any repeats, must leave
//! the stores in the same state.

use crate::core_engine::EventReflector;
use crate::core_message::{CastId, Category, Message, MessageHash, ReactionType, UserDataType};
use crate::core_store::{MessageStore, Stores};
use crate::test_utils::{public_signer_key, signer_key_from_seed, TestAccount};
use proptest::prelude::*;
use std::sync::Arc;

/// Conflicting writes for one account across every category
fn universe(alice: &TestAccount) -> Vec<Message> {
    let key = &alice.signer;
    let other = TestAccount::new(2).unwrap().fid;
    let target = CastId::new(other, MessageHash::from_array([3; 20]));
    let second_key = public_signer_key(&signer_key_from_seed(77));

    let cast = alice.builder(100).cast_add("first").sign(key).unwrap();
    vec![
        cast.clone(),
        alice.builder(90).cast_remove(*cast.hash()).sign(key).unwrap(),
        alice.builder(101).cast_add("second").sign(key).unwrap(),
        alice.builder(100).follow_add(other).sign(key).unwrap(),
        alice.builder(100).follow_remove(other).sign(key).unwrap(),
        alice.builder(102).follow_add(other).sign(key).unwrap(),
        alice.builder(100).reaction_add(ReactionType::Like, target).sign(key).unwrap(),
        alice.builder(100).reaction_remove(ReactionType::Like, target).sign(key).unwrap(),
        alice.builder(100).reaction_add(ReactionType::Recast, target).sign(key).unwrap(),
        alice.builder(100).user_data(UserDataType::Bio, "x").sign(key).unwrap(),
        alice.builder(100).user_data(UserDataType::Bio, "y").sign(key).unwrap(),
        alice.builder(99).user_data(UserDataType::Url, "https://a.example").sign(key).unwrap(),
        alice.signer_add(second_key, 10).unwrap(),
        alice.signer_remove(second_key, 11).unwrap(),
        alice.signer_add(second_key, 11).unwrap(),
    ]
}

/// Merge `order` into fresh stores and snapshot every category
fn converge(alice: &TestAccount, messages: &[Message], order: &[usize]) -> Vec<(Category, Vec<Message>)> {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        let stores = Stores::new(Arc::new(EventReflector::default()));
        stores.signer.apply_custody_event(&alice.register_event(1)).await.unwrap();

        for &index in order {
            let message = &messages[index];
            let category = message.category().unwrap();
            stores.store_for(category).merge(message).await.unwrap();
        }

        let mut state = Vec::new();
        for category in Category::ALL {
            state.push((category, stores.store_for(category).get_all_messages_by_fid(alice.fid).await.unwrap()));
        }
        state
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_delivery_order_does_not_matter(
        order in Just((0..15usize).collect::<Vec<_>>()).prop_shuffle(),
        repeats in prop::collection::vec(0..15usize, 0..6),
    ) {
        let alice = TestAccount::new(1).unwrap();
        let messages = universe(&alice);
        let canonical: Vec<usize> = (0..messages.len()).collect();

        let mut delivery = order;
        delivery.extend(repeats);

        prop_assert_eq!(converge(&alice, &messages, &delivery), converge(&alice, &messages, &canonical));
    }
}

#[test]
fn test_canonical_state() {
    let alice = TestAccount::new(1).unwrap();
    let messages = universe(&alice);
    let order: Vec<usize> = (0..messages.len()).collect();
    let state = converge(&alice, &messages, &order);

    let count = |category: Category| {
        state.iter().find(|(c, _)| *c == category).map(|(_, messages)| messages.len()).unwrap_or(0)
    };
    // Remove tombstone plus the second cast
    assert_eq!(count(Category::Cast), 2);
    assert_eq!(count(Category::Follow), 1);
    // Like removed on a tie, recast kept
    assert_eq!(count(Category::Reaction), 2);
    assert_eq!(count(Category::UserData), 2);
    // Remove wins the timestamp tie on the second key
    assert_eq!(count(Category::Signer), 1);
}
