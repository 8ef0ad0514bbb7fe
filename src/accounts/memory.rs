use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::accounts::repo::UserStore;
use crate::accounts::repo_types::{UserAccount, UserDocument};
use crate::error::StoreError;

/// Keeps documents in the same string form the remote store uses.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, UserDocument>>,
}

impl MemoryStore {
    pub async fn insert(&self, user_id: &str, doc: UserDocument) {
        self.docs.lock().await.insert(user_id.to_string(), doc);
    }

    pub async fn get(&self, user_id: &str) -> Option<UserDocument> {
        self.docs.lock().await.get(user_id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn fetch_or_initialize(&self, user_id: &str) -> Result<UserAccount, StoreError> {
        let fresh = UserDocument::try_from(&UserAccount::default())?;
        let mut docs = self.docs.lock().await;
        let doc = docs.entry(user_id.to_string()).or_insert(fresh).clone();
        doc.into_account(user_id)
    }

    async fn apply_mine(
        &self,
        user_id: &str,
        new_balance: f64,
        now: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let doc = docs
            .get_mut(user_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no document for user {user_id}")))?;
        *doc = UserDocument::try_from(&UserAccount {
            balance: new_balance,
            last_mine_at: now,
        })?;
        Ok(())
    }
}
