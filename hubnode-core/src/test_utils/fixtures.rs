//! Test fixtures for accounts, keys and registry events
//!
//! Keys are derived from small integer seeds so every run produces the
//! same addresses, signer keys and message hashes.

use crate::core_message::eth::custody_address;
use crate::core_message::{
    Address, CustodySigningKey, Fid, IdRegistryEvent, IdRegistryEventType, Message, MessageBuilder,
    NameRegistryEvent, NameRegistryEventType, Network, SignerKey, ValidationError, ValidationResult,
};
use ed25519_dalek::SigningKey;

/// Network used by every fixture
pub const TEST_NETWORK: Network = Network::Devnet;

fn seed_bytes(domain: &str, seed: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(&seed.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Deterministic secp256k1 custody key
pub fn custody_key_from_seed(seed: u64) -> ValidationResult<CustodySigningKey> {
    CustodySigningKey::from_slice(&seed_bytes("hubnode-test-custody", seed))
        .map_err(|e| ValidationError::InvalidSigner(e.to_string()))
}

/// Deterministic Ed25519 signer key
pub fn signer_key_from_seed(seed: u64) -> SigningKey {
    SigningKey::from_bytes(&seed_bytes("hubnode-test-signer", seed))
}

pub fn public_signer_key(key: &SigningKey) -> SignerKey {
    SignerKey::from_array(key.verifying_key().to_bytes())
}

/// An account with a custody key and one delegated signer key
pub struct TestAccount {
    pub fid: Fid,
    pub custody: CustodySigningKey,
    pub signer: SigningKey,
}

impl TestAccount {
    pub fn new(fid: u64) -> ValidationResult<Self> {
        Ok(TestAccount {
            fid: Fid::new(fid)?,
            custody: custody_key_from_seed(fid)?,
            signer: signer_key_from_seed(fid),
        })
    }

    pub fn custody_address(&self) -> Address {
        custody_address(&self.custody)
    }

    pub fn signer_key(&self) -> SignerKey {
        public_signer_key(&self.signer)
    }

    /// Builder for this account on the test network
    pub fn builder(&self, timestamp: u32) -> MessageBuilder {
        MessageBuilder::new(self.fid).network(TEST_NETWORK).timestamp(timestamp)
    }

    /// Register event binding the account to its custody address
    pub fn register_event(&self, block_number: u64) -> IdRegistryEvent {
        IdRegistryEvent {
            fid: self.fid,
            event_type: IdRegistryEventType::Register,
            to: self.custody_address(),
            from: None,
            block_number,
            block_hash: vec![block_number as u8; 32],
            transaction_hash: vec![0xee; 32],
            log_index: 0,
        }
    }

    /// Transfer event moving the account to `to`
    pub fn transfer_event(&self, from: Address, to: Address, block_number: u64) -> IdRegistryEvent {
        IdRegistryEvent {
            event_type: IdRegistryEventType::Transfer,
            to,
            from: Some(from),
            ..self.register_event(block_number)
        }
    }

    /// Name transfer of `fname` to this account's custody address
    pub fn name_event(&self, fname: &str, block_number: u64) -> NameRegistryEvent {
        NameRegistryEvent {
            fname: fname.to_string(),
            event_type: NameRegistryEventType::Transfer,
            to: self.custody_address(),
            from: None,
            expiry: u64::MAX,
            block_number,
            block_hash: vec![block_number as u8; 32],
            transaction_hash: vec![0xee; 32],
            log_index: 0,
        }
    }

    /// Custody-signed Signer Add for `key`
    pub fn signer_add(&self, key: SignerKey, timestamp: u32) -> ValidationResult<Message> {
        self.builder(timestamp).signer_add(key).sign_custody(&self.custody)
    }

    /// Custody-signed Signer Remove for `key`
    pub fn signer_remove(&self, key: SignerKey, timestamp: u32) -> ValidationResult<Message> {
        self.builder(timestamp).signer_remove(key).sign_custody(&self.custody)
    }
}
