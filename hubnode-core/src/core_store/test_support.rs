//! Store test fixtures

use super::events::{EventSink, HubEvent};
use crate::core_message::{CustodySigningKey, Fid, MessageBuilder, Network};
use ed25519_dalek::SigningKey;
use std::sync::Mutex;

/// Sink that keeps every event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<HubEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<HubEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for RecordingSink {
    fn reflect(&self, event: HubEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn fid(n: u64) -> Fid {
    Fid::new(n).unwrap()
}

pub fn builder(fid_value: u64, timestamp: u32) -> MessageBuilder {
    MessageBuilder::new(fid(fid_value)).network(Network::Devnet).timestamp(timestamp)
}

pub fn key_a() -> SigningKey {
    SigningKey::from_bytes(&[0xa1; 32])
}

pub fn key_b() -> SigningKey {
    SigningKey::from_bytes(&[0xb2; 32])
}

pub fn custody_key(seed: u8) -> CustodySigningKey {
    CustodySigningKey::from_slice(&[seed; 32]).unwrap()
}
