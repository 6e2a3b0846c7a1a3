/*
    gate.rs - Validation Gate

    Decides whether a message may enter a store. Checks run in order and
    stop at the first failure:

    1. The account has a custody address (custody event seen)
    2. The signer is authorized: the custody address itself for Signer
       messages, an active signer key for everything else
    3. An fname claim is backed by a name registry event whose owner is the
       custody address
    4. Schema, hash and signature are valid

    The gate only reads store state.
*/

use super::errors::{HubError, HubResult};
use crate::core_message::{Address, Category, Message, MessageValidator, Signer};
use crate::core_store::{StoreError, Stores};
use std::sync::Arc;
use tracing::debug;

pub struct ValidationGate {
    stores: Arc<Stores>,
    validator: MessageValidator,
}

impl ValidationGate {
    pub fn new(stores: Arc<Stores>, validator: MessageValidator) -> Self {
        ValidationGate { stores, validator }
    }

    pub fn validator(&self) -> &MessageValidator {
        &self.validator
    }

    /// Validate `message` against current state, returning an owned copy
    pub async fn validate(&self, message: &Message) -> HubResult<Message> {
        let fid = message.fid();

        let custody = match self.stores.signer.get_custody_address(fid).await {
            Ok(address) => address,
            Err(StoreError::NotFound(_)) => {
                debug!(fid = %fid, "rejecting message for unknown account");
                return Err(HubError::auth("unknown account"));
            }
            Err(err) => return Err(err.into()),
        };

        let category = message.category().ok_or_else(|| HubError::request("invalid message type"))?;
        self.check_signer(message, category, custody).await?;
        self.check_fname(message, custody).await?;

        self.validator.validate(message)?;
        Ok(message.clone())
    }

    async fn check_signer(&self, message: &Message, category: Category, custody: Address) -> HubResult<()> {
        let authorized = match (category, message.signer()) {
            (Category::Signer, Signer::Custody(address)) => *address == custody,
            (Category::Signer, Signer::Key(_)) => false,
            (_, Signer::Key(key)) => match self.stores.signer.get_signer_add(message.fid(), *key).await {
                Ok(_) => true,
                Err(StoreError::NotFound(_)) => false,
                Err(err) => return Err(err.into()),
            },
            (_, Signer::Custody(_)) => false,
        };

        if authorized {
            Ok(())
        } else {
            debug!(message = %message, signer = %message.signer(), "rejecting unauthorized signer");
            Err(HubError::auth("invalid signer"))
        }
    }

    async fn check_fname(&self, message: &Message, custody: Address) -> HubResult<()> {
        let Some(fname) = message.fname_claim() else {
            return Ok(());
        };

        let owner = match self.stores.user_data.get_name_registry_event(fname).await {
            Ok(event) => Some(event.to),
            Err(StoreError::NotFound(_)) => None,
            Err(err) => return Err(err.into()),
        };

        if owner == Some(custody) {
            Ok(())
        } else {
            debug!(fid = %message.fid(), fname, "fname not owned by custody address");
            Err(HubError::auth("fname custody mismatch"))
        }
    }
}
