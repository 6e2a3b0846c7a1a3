/*
    events.rs - Decoded registry events

    Custody (id registry) and name registry events arrive already decoded
    from chain logs. Later events for the same fid or fname supersede earlier
    ones; "later" means a higher (block_number, log_index).
*/

use super::types::{Address, Fid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an event in chain order
pub type ChainPosition = (u64, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdRegistryEventType {
    Register,
    Transfer,
    ChangeRecoveryAddress,
}

impl fmt::Display for IdRegistryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Binds an fid to its custody address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRegistryEvent {
    pub fid: Fid,
    pub event_type: IdRegistryEventType,
    /// New custody address
    pub to: Address,
    /// Previous custody address, absent on register
    pub from: Option<Address>,
    pub block_number: u64,
    pub block_hash: Vec<u8>,
    pub transaction_hash: Vec<u8>,
    pub log_index: u32,
}

impl IdRegistryEvent {
    pub fn position(&self) -> ChainPosition {
        (self.block_number, self.log_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameRegistryEventType {
    Transfer,
    Renew,
    ChangeRecoveryAddress,
}

impl fmt::Display for NameRegistryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Binds an fname to a custody address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRegistryEvent {
    pub fname: String,
    pub event_type: NameRegistryEventType,
    pub to: Address,
    pub from: Option<Address>,
    /// Unix seconds after which the name lapses
    pub expiry: u64,
    pub block_number: u64,
    pub block_hash: Vec<u8>,
    pub transaction_hash: Vec<u8>,
    pub log_index: u32,
}

impl NameRegistryEvent {
    pub fn position(&self) -> ChainPosition {
        (self.block_number, self.log_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_orders_by_block_then_log() {
        let event = |block_number, log_index| IdRegistryEvent {
            fid: Fid::new(1).unwrap(),
            event_type: IdRegistryEventType::Register,
            to: Address::from_array([1; 20]),
            from: None,
            block_number,
            block_hash: vec![],
            transaction_hash: vec![],
            log_index,
        };

        assert!(event(10, 0).position() > event(9, 99).position());
        assert!(event(10, 2).position() > event(10, 1).position());
    }
}
