//! Change events emitted by stores after a successful commit
//!
//! Stores only know the `EventSink` seam; the engine's reflector is the
//! production implementation.

use crate::core_message::{IdRegistryEvent, Message, NameRegistryEvent};
use serde::Serialize;

/// State change committed by a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HubEvent {
    /// A message entered a set, displacing `deleted`
    MergeMessage { message: Message, deleted: Vec<Message> },

    /// A message was dropped because its signer was revoked
    RevokeMessage { message: Message },

    MergeIdRegistryEvent { event: IdRegistryEvent },

    MergeNameRegistryEvent { event: NameRegistryEvent },
}

impl HubEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HubEvent::MergeMessage { .. } => "merge_message",
            HubEvent::RevokeMessage { .. } => "revoke_message",
            HubEvent::MergeIdRegistryEvent { .. } => "merge_id_registry_event",
            HubEvent::MergeNameRegistryEvent { .. } => "merge_name_registry_event",
        }
    }
}

/// Receives store change events
pub trait EventSink: Send + Sync {
    fn reflect(&self, event: HubEvent);
}
