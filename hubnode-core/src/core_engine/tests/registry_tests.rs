//! Registry ingestion tests

use super::helpers::*;
use crate::core_engine::{AuditAction, HubError};
use crate::core_message::{IdRegistryEventType, NameRegistryEventType};
use crate::core_store::{CustodyUpdate, HubEvent, MessageStore, NameUpdate};
use crate::test_utils::{public_signer_key, signer_key_from_seed};

#[tokio::test]
async fn test_register_makes_account_known() {
    let engine = engine();
    let alice = account(1);
    let mut events = engine.subscribe();

    let update = engine.apply_custody_event(&alice.register_event(1), SOURCE).await.unwrap();
    assert_eq!(update, CustodyUpdate::Applied { previous: None });

    assert_eq!(engine.query().get_fids().await.unwrap(), vec![alice.fid]);
    assert_eq!(engine.query().get_custody_event(1).await.unwrap(), alice.register_event(1));
    assert_eq!(
        events.recv().await.unwrap(),
        HubEvent::MergeIdRegistryEvent { event: alice.register_event(1) }
    );
    assert_eq!(engine.recent_audits().last().map(|r| r.action), Some(AuditAction::MergeIdRegistryEvent));
}

#[tokio::test]
async fn test_recovery_change_is_refused() {
    let engine = engine();
    let alice = account(1);
    let mut event = alice.register_event(1);
    event.event_type = IdRegistryEventType::ChangeRecoveryAddress;

    let err = engine.apply_custody_event(&event, SOURCE).await.unwrap_err();
    assert_eq!(err, HubError::Request("invalid event type".to_string()));
    assert!(engine.query().get_custody_event(1).await.unwrap_err().is_not_found());
    assert!(engine.query().get_fids().await.unwrap().is_empty());
    assert!(engine.recent_audits().is_empty());
}

#[tokio::test]
async fn test_stale_custody_event_is_a_no_op() {
    let (engine, alice) = engine_with(1).await;
    let bob = account(2);
    let transfer = alice.transfer_event(alice.custody_address(), bob.custody_address(), 10);
    engine.apply_custody_event(&transfer, SOURCE).await.unwrap();
    let audits = engine.recent_audits().len();

    // Replaying the older register changes nothing
    let update = engine.apply_custody_event(&alice.register_event(1), SOURCE).await.unwrap();
    assert_eq!(update, CustodyUpdate::Stale);
    assert_eq!(engine.query().get_custody_event(1).await.unwrap(), transfer);
    assert_eq!(engine.recent_audits().len(), audits);

    let replay = engine.apply_custody_event(&transfer, SOURCE).await.unwrap();
    assert_eq!(replay, CustodyUpdate::Stale);
}

#[tokio::test]
async fn test_transfer_revokes_old_custody_signers() {
    let (engine, alice) = engine_with(1).await;
    let new_owner = account(2);
    let kept_key = signer_key_from_seed(300);
    merge(&engine, &alice.signer_add(public_signer_key(&kept_key), 20).unwrap()).await;

    let dropped_cast = alice.builder(100).cast_add("old key").sign(&alice.signer).unwrap();
    let kept_cast = alice.builder(100).cast_add("kept key").sign(&kept_key).unwrap();
    merge(&engine, &dropped_cast).await;
    merge(&engine, &kept_cast).await;

    // The new owner's grant of `kept_key`, synced ahead of the transfer event
    let regrant = alice
        .builder(30)
        .signer_add(public_signer_key(&kept_key))
        .sign_custody(&new_owner.custody)
        .unwrap();
    engine.stores().signer.merge(&regrant).await.unwrap();

    let transfer = alice.transfer_event(alice.custody_address(), new_owner.custody_address(), 5);
    let update = engine.apply_custody_event(&transfer, SOURCE).await.unwrap();
    assert_eq!(update, CustodyUpdate::Applied { previous: Some(alice.register_event(1)) });

    assert_eq!(engine.query().get_casts_by_user(1).await.unwrap(), vec![kept_cast]);
    assert_eq!(engine.query().get_all_signer_messages_by_fid(1).await.unwrap(), vec![regrant]);
    assert_eq!(
        engine.stores().signer.get_active_signers(alice.fid).await.unwrap(),
        vec![public_signer_key(&kept_key)]
    );

    // The old custody can no longer manage signers
    let late_add = alice.signer_add(public_signer_key(&signer_key_from_seed(301)), 40).unwrap();
    assert!(matches!(engine.merge_message(&late_add, SOURCE).await, Err(HubError::Auth(_))));
}

#[tokio::test]
async fn test_transfer_to_same_address_revokes_nothing() {
    let (engine, alice) = engine_with(1).await;
    let cast = alice.builder(100).cast_add("unchanged").sign(&alice.signer).unwrap();
    merge(&engine, &cast).await;

    let transfer = alice.transfer_event(alice.custody_address(), alice.custody_address(), 5);
    engine.apply_custody_event(&transfer, SOURCE).await.unwrap();

    assert_eq!(engine.query().get_casts_by_user(1).await.unwrap(), vec![cast]);
    assert_eq!(engine.stores().signer.get_all_messages_by_fid(alice.fid).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_name_events() {
    let engine = engine();
    let alice = account(1);
    let transfer = alice.name_event("alice", 5);

    assert_eq!(
        engine.apply_name_event(&transfer, SOURCE).await.unwrap(),
        NameUpdate::Applied { previous: None }
    );
    assert_eq!(engine.query().get_name_registry_event("alice").await.unwrap(), transfer);

    let renew = crate::core_message::NameRegistryEvent {
        event_type: NameRegistryEventType::Renew,
        block_number: 6,
        ..transfer.clone()
    };
    assert_eq!(
        engine.apply_name_event(&renew, SOURCE).await.unwrap(),
        NameUpdate::Applied { previous: Some(transfer.clone()) }
    );
    assert_eq!(engine.apply_name_event(&transfer, SOURCE).await.unwrap(), NameUpdate::Stale);
    assert_eq!(engine.query().get_name_registry_event("alice").await.unwrap(), renew);
}

#[tokio::test]
async fn test_name_recovery_change_is_refused() {
    let engine = engine();
    let alice = account(1);
    let mut event = alice.name_event("alice", 5);
    event.event_type = NameRegistryEventType::ChangeRecoveryAddress;

    let err = engine.apply_name_event(&event, SOURCE).await.unwrap_err();
    assert_eq!(err, HubError::Request("invalid event type".to_string()));
    assert!(engine.query().get_name_registry_event("alice").await.unwrap_err().is_not_found());
}
