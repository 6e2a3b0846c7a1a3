//! The six category stores, sharing one event sink

use super::cast_store::CastStore;
use super::events::EventSink;
use super::follow_store::FollowStore;
use super::reaction_store::ReactionStore;
use super::signer_store::SignerStore;
use super::traits::MessageStore;
use super::user_data_store::UserDataStore;
use super::verification_store::VerificationStore;
use crate::core_message::Category;
use std::sync::Arc;

pub struct Stores {
    pub cast: Arc<CastStore>,
    pub follow: Arc<FollowStore>,
    pub reaction: Arc<ReactionStore>,
    pub verification: Arc<VerificationStore>,
    pub signer: Arc<SignerStore>,
    pub user_data: Arc<UserDataStore>,
}

impl Stores {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Stores {
            cast: Arc::new(CastStore::new(sink.clone())),
            follow: Arc::new(FollowStore::new(sink.clone())),
            reaction: Arc::new(ReactionStore::new(sink.clone())),
            verification: Arc::new(VerificationStore::new(sink.clone())),
            signer: Arc::new(SignerStore::new(sink.clone())),
            user_data: Arc::new(UserDataStore::new(sink)),
        }
    }

    /// Store owning a category
    pub fn store_for(&self, category: Category) -> &dyn MessageStore {
        match category {
            Category::Cast => self.cast.as_ref(),
            Category::Follow => self.follow.as_ref(),
            Category::Reaction => self.reaction.as_ref(),
            Category::Verification => self.verification.as_ref(),
            Category::Signer => self.signer.as_ref(),
            Category::UserData => self.user_data.as_ref(),
        }
    }

    /// Every store, in the order revocation visits them; signers last
    pub fn revocation_order(&self) -> Vec<Arc<dyn MessageStore>> {
        let cast: Arc<dyn MessageStore> = self.cast.clone();
        let follow: Arc<dyn MessageStore> = self.follow.clone();
        let reaction: Arc<dyn MessageStore> = self.reaction.clone();
        let verification: Arc<dyn MessageStore> = self.verification.clone();
        let user_data: Arc<dyn MessageStore> = self.user_data.clone();
        let signer: Arc<dyn MessageStore> = self.signer.clone();
        vec![cast, follow, reaction, verification, user_data, signer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_store::test_support::RecordingSink;

    #[test]
    fn test_store_for_matches_category() {
        let stores = Stores::new(Arc::new(RecordingSink::default()));
        for category in Category::ALL {
            assert_eq!(stores.store_for(category).category(), category);
        }
    }

    #[test]
    fn test_revocation_order_ends_with_signers() {
        let stores = Stores::new(Arc::new(RecordingSink::default()));
        let order: Vec<Category> = stores.revocation_order().iter().map(|s| s.category()).collect();
        assert_eq!(
            order,
            vec![
                Category::Cast,
                Category::Follow,
                Category::Reaction,
                Category::Verification,
                Category::UserData,
                Category::Signer,
            ]
        );
    }
}
