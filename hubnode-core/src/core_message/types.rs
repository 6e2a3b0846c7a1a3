//! Identifier types shared by messages, events, and stores
//!
//! All fixed-width identifiers parse from raw bytes through `TryFrom<&[u8]>`,
//! so the length check happens exactly once at the boundary.

use super::errors::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a custody or verified Ethereum address
pub const ADDRESS_LENGTH: usize = 20;

/// Length of an Ed25519 signer public key
pub const SIGNER_KEY_LENGTH: usize = 32;

/// Length of a truncated BLAKE3 message hash
pub const HASH_LENGTH: usize = 20;

/// Numeric account identifier, never zero
///
/// Decoding goes through [`Fid::new`], so a zero fid cannot enter the
/// system from the wire or from disk either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Fid(u64);

impl Fid {
    /// Create an fid, rejecting zero
    pub fn new(value: u64) -> ValidationResult<Self> {
        if value == 0 {
            return Err(ValidationError::InvalidFid);
        }
        Ok(Fid(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Fid {
    type Error = ValidationError;

    fn try_from(value: u64) -> ValidationResult<Self> {
        Fid::new(value)
    }
}

impl From<Fid> for u64 {
    fn from(fid: Fid) -> u64 {
        fid.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> ValidationResult<[u8; N]> {
    bytes.try_into().map_err(|_| ValidationError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// 20-byte Ethereum address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn from_array(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ValidationError;

    fn try_from(bytes: &[u8]) -> ValidationResult<Self> {
        fixed("address", bytes).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Ed25519 public key of a delegated signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignerKey([u8; SIGNER_KEY_LENGTH]);

impl SignerKey {
    pub const fn from_array(bytes: [u8; SIGNER_KEY_LENGTH]) -> Self {
        SignerKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNER_KEY_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SignerKey {
    type Error = ValidationError;

    fn try_from(bytes: &[u8]) -> ValidationResult<Self> {
        fixed("signer key", bytes).map(SignerKey)
    }
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Content hash of a message: BLAKE3 over the canonical data, truncated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageHash([u8; HASH_LENGTH]);

impl MessageHash {
    /// Hash canonical message data bytes
    pub fn digest(data: &[u8]) -> Self {
        let full = blake3::hash(data);
        let mut truncated = [0u8; HASH_LENGTH];
        truncated.copy_from_slice(&full.as_bytes()[..HASH_LENGTH]);
        MessageHash(truncated)
    }

    pub const fn from_array(bytes: [u8; HASH_LENGTH]) -> Self {
        MessageHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MessageHash {
    type Error = ValidationError;

    fn try_from(bytes: &[u8]) -> ValidationResult<Self> {
        fixed("hash", bytes).map(MessageHash)
    }
}

impl fmt::Display for MessageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identity that produced a message signature
///
/// Signer messages are signed by the account's custody address (EIP-191,
/// secp256k1). Every other message is signed by a delegated Ed25519 key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Signer {
    Custody(Address),
    Key(SignerKey),
}

impl Signer {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Signer::Custody(address) => address.as_bytes(),
            Signer::Key(key) => key.as_bytes(),
        }
    }
}

impl From<SignerKey> for Signer {
    fn from(key: SignerKey) -> Self {
        Signer::Key(key)
    }
}

impl From<Address> for Signer {
    fn from(address: Address) -> Self {
        Signer::Custody(address)
    }
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signer::Custody(address) => write!(f, "custody:{}", address),
            Signer::Key(key) => write!(f, "key:{}", key),
        }
    }
}

/// Identifies a cast by author and hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CastId {
    pub fid: Fid,
    pub hash: MessageHash,
}

impl CastId {
    pub fn new(fid: Fid, hash: MessageHash) -> Self {
        CastId { fid, hash }
    }
}

impl fmt::Display for CastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fid, self.hash)
    }
}
