/*
    eth.rs - Ethereum-style (EIP-191) signatures

    Custody addresses sign Signer messages, and verification claims are
    signed by the address being verified. Both use secp256k1 recoverable
    signatures over an EIP-191 personal-message digest; the signer is
    identified by recovering its address rather than by a stored key.

    Signature layout: r (32) || s (32) || v (1), v in {0, 1, 27, 28}.
*/

use super::errors::{ValidationError, ValidationResult};
use super::types::{Address, ADDRESS_LENGTH};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Length of a recoverable secp256k1 signature
pub const ETH_SIGNATURE_LENGTH: usize = 65;

/// Signing key type held by a custody address
pub type CustodySigningKey = SigningKey;

/// Keccak256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// EIP-191 personal message digest of `payload`
pub fn eip191_hash(payload: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", payload.len());
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(payload);
    keccak256(&data)
}

/// Address of a secp256k1 public key (last 20 bytes of keccak of x || y)
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&hash[12..]);
    Address::from_array(address)
}

/// Address controlled by a custody signing key
pub fn custody_address(key: &CustodySigningKey) -> Address {
    address_from_verifying_key(key.verifying_key())
}

/// Sign `payload` as an EIP-191 personal message
pub fn sign_eip191(key: &CustodySigningKey, payload: &[u8]) -> ValidationResult<Vec<u8>> {
    let digest = eip191_hash(payload);
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;

    let mut out = Vec::with_capacity(ETH_SIGNATURE_LENGTH);
    out.extend_from_slice(&signature.to_bytes());
    out.push(recovery_id.to_byte() + 27);
    Ok(out)
}

/// Recover the address that produced an EIP-191 signature over `payload`
pub fn recover_eip191(payload: &[u8], signature: &[u8]) -> ValidationResult<Address> {
    if signature.len() != ETH_SIGNATURE_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "eth signature",
            expected: ETH_SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    let recovery_id = match signature[64] {
        0 | 27 => 0,
        1 | 28 => 1,
        v => return Err(ValidationError::InvalidSignature(format!("invalid recovery id {}", v))),
    };
    let recovery_id = RecoveryId::try_from(recovery_id)
        .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;
    let signature = Signature::from_slice(&signature[..64])
        .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;

    let digest = eip191_hash(payload);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| ValidationError::InvalidSignature("public key recovery failed".to_string()))?;

    Ok(address_from_verifying_key(&key))
}

/// Check that `signature` over `payload` was produced by `expected`
pub fn verify_eip191(payload: &[u8], signature: &[u8], expected: &Address) -> ValidationResult<()> {
    let recovered = recover_eip191(payload, signature)?;
    if &recovered != expected {
        return Err(ValidationError::InvalidSignature(format!(
            "recovered {} but expected {}",
            recovered, expected
        )));
    }
    Ok(())
}
