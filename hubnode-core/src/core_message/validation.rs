/*
    validation.rs - Schema and signature validation

    Validates a message in isolation, without looking at any store:
    - Network (a zero fid never decodes, so there is no fid check here)
    - Timestamp drift
    - Body shape for the declared type
    - Hash over the canonical data
    - Signature against the declared signer

    Authorization (is this signer allowed to write for this fid?) is not
    decided here; that needs store state and lives in the engine's gate.
*/

use super::errors::{ValidationError, ValidationResult};
use super::eth;
use super::message::{
    body_mismatch, CastAddBody, Category, Message, MessageBody, MessageData, Network,
    UserDataBody, UserDataType, VerificationAddBody, VerificationClaim,
};
use super::time::farcaster_time_now;
use super::types::Signer;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

pub const MAX_CAST_TEXT_BYTES: usize = 320;
pub const MAX_CAST_EMBEDS: usize = 2;
pub const MAX_EMBED_BYTES: usize = 256;
pub const MAX_CAST_MENTIONS: usize = 10;
pub const MAX_FNAME_LENGTH: usize = 16;
pub const BLOCK_HASH_LENGTH: usize = 32;

/// Allowed clock drift for message timestamps, seconds
pub const DEFAULT_MAX_FUTURE_SECS: u32 = 10 * 60;

/// Validation rules
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Network this node accepts messages for
    pub network: Network,

    /// How far ahead of the local clock a timestamp may be
    pub max_future_secs: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules { network: Network::Mainnet, max_future_secs: DEFAULT_MAX_FUTURE_SECS }
    }
}

/// Stateless schema + signature validator
#[derive(Debug, Clone, Default)]
pub struct MessageValidator {
    rules: ValidationRules,
}

impl MessageValidator {
    pub fn new(rules: ValidationRules) -> Self {
        MessageValidator { rules }
    }

    pub fn for_network(network: Network) -> Self {
        MessageValidator::new(ValidationRules { network, ..Default::default() })
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate a full message: data, hash, and signature
    pub fn validate(&self, message: &Message) -> ValidationResult<()> {
        self.validate_data(&message.data)?;

        if message.data.hash()? != message.hash {
            return Err(ValidationError::InvalidHash);
        }

        self.validate_signature(message)
    }

    /// Validate the signed data without hash or signature checks
    pub fn validate_data(&self, data: &MessageData) -> ValidationResult<()> {
        if data.network != self.rules.network {
            return Err(ValidationError::NetworkMismatch {
                expected: self.rules.network.to_string(),
                actual: data.network.to_string(),
            });
        }

        let now = farcaster_time_now();
        if data.timestamp > now.saturating_add(self.rules.max_future_secs) {
            return Err(ValidationError::FutureTimestamp(self.rules.max_future_secs));
        }

        if !data.body.fits(data.message_type) {
            return Err(body_mismatch(data.message_type));
        }

        match &data.body {
            MessageBody::CastAdd(body) => validate_cast_add(body),
            MessageBody::VerificationAdd(body) => validate_verification_add(data, body),
            MessageBody::UserData(body) => validate_user_data(body),
            MessageBody::CastRemove(_)
            | MessageBody::Reaction(_)
            | MessageBody::Follow(_)
            | MessageBody::VerificationRemove(_)
            | MessageBody::Signer(_) => Ok(()),
        }
    }

    fn validate_signature(&self, message: &Message) -> ValidationResult<()> {
        let hash = message.hash.as_bytes();
        match (message.category(), &message.signer) {
            (Some(Category::Signer), Signer::Custody(address)) => {
                eth::verify_eip191(hash, &message.signature, address)
            }
            (Some(Category::Signer), Signer::Key(_)) => Err(ValidationError::InvalidSigner(
                "signer messages must be signed by the custody address".to_string(),
            )),
            (_, Signer::Key(key)) => {
                let verifying_key = VerifyingKey::from_bytes(key.as_bytes())
                    .map_err(|e| ValidationError::InvalidSigner(e.to_string()))?;
                let signature = Signature::from_slice(&message.signature)
                    .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;
                verifying_key
                    .verify(hash, &signature)
                    .map_err(|e| ValidationError::InvalidSignature(e.to_string()))
            }
            (_, Signer::Custody(_)) => Err(ValidationError::InvalidSigner(
                "only signer messages may be signed by the custody address".to_string(),
            )),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField { field, reason: reason.into() }
}

fn validate_cast_add(body: &CastAddBody) -> ValidationResult<()> {
    if body.text.len() > MAX_CAST_TEXT_BYTES {
        return Err(invalid("text", format!("longer than {} bytes", MAX_CAST_TEXT_BYTES)));
    }

    if body.embeds.len() > MAX_CAST_EMBEDS {
        return Err(invalid("embeds", format!("more than {} embeds", MAX_CAST_EMBEDS)));
    }
    for embed in &body.embeds {
        if embed.is_empty() || embed.len() > MAX_EMBED_BYTES {
            return Err(invalid("embeds", format!("embed must be 1..={} bytes", MAX_EMBED_BYTES)));
        }
    }

    if body.mentions.len() > MAX_CAST_MENTIONS {
        return Err(invalid("mentions", format!("more than {} mentions", MAX_CAST_MENTIONS)));
    }
    if body.mentions.len() != body.mentions_positions.len() {
        return Err(invalid("mentions_positions", "must match mentions"));
    }

    let mut previous = 0u32;
    for &position in &body.mentions_positions {
        if position < previous || position as usize > body.text.len() {
            return Err(invalid("mentions_positions", "must be ascending and within text"));
        }
        previous = position;
    }

    Ok(())
}

fn validate_verification_add(data: &MessageData, body: &VerificationAddBody) -> ValidationResult<()> {
    if body.block_hash.len() != BLOCK_HASH_LENGTH {
        return Err(ValidationError::InvalidLength {
            field: "block hash",
            expected: BLOCK_HASH_LENGTH,
            actual: body.block_hash.len(),
        });
    }

    let claim = VerificationClaim {
        fid: data.fid,
        address: body.address,
        network: data.network,
        block_hash: body.block_hash.clone(),
    };
    eth::verify_eip191(&claim.encode()?, &body.eth_signature, &body.address)
}

fn validate_user_data(body: &UserDataBody) -> ValidationResult<()> {
    let max_len = match body.user_data_type {
        UserDataType::Pfp | UserDataType::Bio | UserDataType::Url => 256,
        UserDataType::Display => 32,
        UserDataType::Fname => {
            if body.value.is_empty() {
                return Ok(());
            }
            return validate_fname(&body.value);
        }
    };

    if body.value.len() > max_len {
        return Err(invalid("user data value", format!("longer than {} bytes", max_len)));
    }
    Ok(())
}

/// Check an fname: 1-16 chars of `[a-z0-9-]`, not starting with `-`
pub fn validate_fname(fname: &str) -> ValidationResult<()> {
    if fname.is_empty() || fname.len() > MAX_FNAME_LENGTH {
        return Err(invalid("fname", format!("must be 1..={} characters", MAX_FNAME_LENGTH)));
    }

    let valid_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let mut chars = fname.chars();
    if !chars.next().is_some_and(valid_char) {
        return Err(invalid("fname", "must start with a lowercase letter or digit"));
    }
    if !chars.all(|c| valid_char(c) || c == '-') {
        return Err(invalid("fname", "may only contain a-z, 0-9 and -"));
    }
    Ok(())
}
