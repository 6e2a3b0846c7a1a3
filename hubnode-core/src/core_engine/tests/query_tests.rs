//! Query surface tests

use super::helpers::*;
use crate::core_engine::HubError;
use crate::core_message::{ReactionType, UserDataType};
use crate::core_store::NodeState;
use crate::test_utils::custody_key_from_seed;

#[tokio::test]
async fn test_malformed_arguments_are_request_errors() {
    let (engine, _alice) = engine_with(1).await;
    let query = engine.query();

    assert!(matches!(query.get_casts_by_user(0).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_cast(1, &[0; 5]).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_follow(1, 0).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_verification(1, &[0; 21]).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_signer(1, &[0; 31]).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_casts_by_parent(0, &[0; 20]).await, Err(HubError::Request(_))));
    assert!(matches!(query.get_name_registry_event("Not A Name").await, Err(HubError::Request(_))));
}

#[tokio::test]
async fn test_missing_entity_vs_empty_listing() {
    let (engine, _alice) = engine_with(1).await;
    let query = engine.query();

    assert!(query.get_cast(1, &[7; 20]).await.unwrap_err().is_not_found());
    assert!(query.get_follow(1, 2).await.unwrap_err().is_not_found());
    assert!(query.get_user_data(1, UserDataType::Pfp).await.unwrap_err().is_not_found());
    assert!(query.get_custody_event(5).await.unwrap_err().is_not_found());

    assert!(query.get_casts_by_user(1).await.unwrap().is_empty());
    assert!(query.get_follows_by_user(5).await.unwrap().is_empty());
    assert!(query.get_reactions_by_user(1, None).await.unwrap().is_empty());
    assert!(query.get_signers_by_user(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cast_queries() {
    let (engine, alice) = engine_with(1).await;
    let bob = account(2);
    register(&engine, &bob).await;

    let root = alice.builder(100).cast_add("root").sign(&alice.signer).unwrap();
    let reply = bob.builder(101).cast_reply("reply", root.cast_id()).sign(&bob.signer).unwrap();
    let shout = bob
        .builder(102)
        .cast_with_mentions("hey ", vec![(alice.fid, 4)])
        .sign(&bob.signer)
        .unwrap();
    for message in [&root, &reply, &shout] {
        merge(&engine, message).await;
    }

    let query = engine.query();
    assert_eq!(query.get_cast(1, root.hash().as_bytes()).await.unwrap(), root);
    assert_eq!(query.get_casts_by_parent(1, root.hash().as_bytes()).await.unwrap(), vec![reply]);
    assert_eq!(query.get_casts_by_mention(1).await.unwrap(), vec![shout]);
    assert_eq!(query.get_casts_by_user(2).await.unwrap().len(), 2);

    // A removed cast disappears from the add set but leaves a tombstone
    let remove = alice.builder(103).cast_remove(*root.hash()).sign(&alice.signer).unwrap();
    merge(&engine, &remove).await;
    assert!(query.get_cast(1, root.hash().as_bytes()).await.unwrap_err().is_not_found());
    assert_eq!(query.get_all_cast_messages_by_fid(1).await.unwrap(), vec![remove]);
}

#[tokio::test]
async fn test_follow_and_reaction_queries() {
    let (engine, alice) = engine_with(1).await;
    let bob = account(2);
    register(&engine, &bob).await;

    let cast = bob.builder(100).cast_add("like me").sign(&bob.signer).unwrap();
    let follow = alice.builder(101).follow_add(bob.fid).sign(&alice.signer).unwrap();
    let like = alice.builder(102).reaction_add(ReactionType::Like, cast.cast_id()).sign(&alice.signer).unwrap();
    let recast = bob.builder(103).reaction_add(ReactionType::Recast, cast.cast_id()).sign(&bob.signer).unwrap();
    for message in [&cast, &follow, &like, &recast] {
        merge(&engine, message).await;
    }

    let query = engine.query();
    assert_eq!(query.get_follow(1, 2).await.unwrap(), follow);
    assert_eq!(query.get_followers(2).await.unwrap(), vec![follow.clone()]);
    assert_eq!(query.get_follows_by_user(1).await.unwrap(), vec![follow]);

    let hash = cast.hash().as_bytes().to_vec();
    assert_eq!(query.get_reaction(1, ReactionType::Like, 2, &hash).await.unwrap(), like);
    assert_eq!(query.get_reactions_by_cast(2, &hash, None).await.unwrap().len(), 2);
    assert_eq!(
        query.get_reactions_by_cast(2, &hash, Some(ReactionType::Recast)).await.unwrap(),
        vec![recast]
    );
    assert_eq!(query.get_reactions_by_user(1, Some(ReactionType::Recast)).await.unwrap(), vec![]);
}

#[tokio::test]
async fn test_verification_signer_and_user_data_queries() {
    let (engine, alice) = engine_with(1).await;
    let eth_key = custody_key_from_seed(60).unwrap();
    let verification = alice
        .builder(100)
        .verification_add(&eth_key, vec![1; 32])
        .unwrap()
        .sign(&alice.signer)
        .unwrap();
    let bio = alice.builder(101).user_data(UserDataType::Bio, "here").sign(&alice.signer).unwrap();
    merge(&engine, &verification).await;
    merge(&engine, &bio).await;

    let query = engine.query();
    let address = crate::core_message::eth::custody_address(&eth_key);
    assert_eq!(query.get_verification(1, address.as_bytes()).await.unwrap(), verification);
    assert_eq!(query.get_verifications_by_user(1).await.unwrap(), vec![verification]);
    assert_eq!(query.get_user_data(1, UserDataType::Bio).await.unwrap(), bio);
    assert_eq!(query.get_user_data_by_user(1).await.unwrap(), vec![bio.clone()]);
    assert_eq!(query.get_all_user_data_messages_by_fid(1).await.unwrap(), vec![bio]);

    let signer = query.get_signer(1, alice.signer_key().as_bytes()).await.unwrap();
    assert_eq!(query.get_signers_by_user(1).await.unwrap(), vec![signer]);
}

#[tokio::test]
async fn test_registry_queries() {
    let (engine, alice) = engine_with(3).await;
    register(&engine, &account(1)).await;
    engine.apply_name_event(&alice.name_event("carol", 4), SOURCE).await.unwrap();

    let query = engine.query();
    assert_eq!(query.get_fids().await.unwrap(), vec![fid(1), fid(3)]);
    assert_eq!(query.get_custody_event(3).await.unwrap().to, alice.custody_address());
    assert_eq!(query.get_name_registry_event("carol").await.unwrap().to, alice.custody_address());
}

#[tokio::test]
async fn test_node_state() {
    let engine = engine();
    assert_eq!(engine.get_node_state().await.unwrap(), NodeState::default());

    let updated = engine
        .update_node_state(|state| {
            state.last_synced_block = 1200;
            state.last_synced_log_index = 3;
        })
        .await
        .unwrap();
    assert_eq!(updated.last_synced_block, 1200);

    let read = engine.query().get_node_state().await.unwrap();
    assert_eq!(read, updated);
    assert_eq!(read.last_synced_log_index, 3);
}

#[tokio::test]
async fn test_queries_are_counted() {
    let (engine, _alice) = engine_with(1).await;
    let before = engine.metrics().queries;
    engine.query().get_casts_by_user(1).await.unwrap();
    engine.query().get_fids().await.unwrap();
    assert_eq!(engine.metrics().queries - before, 2);
}
