use async_trait::async_trait;
use time::OffsetDateTime;

use crate::accounts::repo_types::UserAccount;
use crate::error::StoreError;

/// Persistence of [`UserAccount`]s, one document per user id.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Existing record, or a freshly created default one.
    async fn fetch_or_initialize(&self, user_id: &str) -> Result<UserAccount, StoreError>;

    /// Overwrite balance and last mine time of an existing record.
    async fn apply_mine(
        &self,
        user_id: &str,
        new_balance: f64,
        now: OffsetDateTime,
    ) -> Result<(), StoreError>;
}
