use crate::accounts::repo::UserStore;
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::firestore::FirestoreStore;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` once connecting at startup failed; never retried.
    pub store: Option<Arc<dyn UserStore>>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> Self {
        let config = Arc::new(config);

        let store = match FirestoreStore::connect(&config.credentials, &config.users_collection)
            .await
        {
            Ok(store) => {
                info!(
                    project_id = %store.project_id(),
                    collection = %config.users_collection,
                    "firestore connected"
                );
                Some(Arc::new(store) as Arc<dyn UserStore>)
            }
            Err(e) => {
                error!(error = %e, "firestore connection failed; commands will report a database error");
                None
            }
        };

        Self::from_parts(config, store)
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Option<Arc<dyn UserStore>>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> Result<&dyn UserStore, StoreError> {
        self.store
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("store was not initialised".into()))
    }

    pub fn is_store_ready(&self) -> bool {
        self.store.is_some()
    }
}

#[cfg(test)]
impl AppState {
    fn fake_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            bot_token: "123456:test".into(),
            credentials: crate::config::CredentialSource::Inline("{}".into()),
            users_collection: "users".into(),
            health_addr: None,
        })
    }

    pub fn fake() -> Self {
        Self::fake_with(Arc::new(crate::accounts::memory::MemoryStore::default()))
    }

    pub fn fake_with(store: Arc<crate::accounts::memory::MemoryStore>) -> Self {
        Self::from_parts(Self::fake_config(), Some(store as Arc<dyn UserStore>))
    }

    pub fn fake_unavailable() -> Self {
        Self::from_parts(Self::fake_config(), None)
    }
}
