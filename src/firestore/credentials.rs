use serde::Deserialize;

use crate::config::CredentialSource;
use crate::error::StoreError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file that are used here.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn parse(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::Unavailable(format!("invalid service account key: {}", e)))
    }

    pub async fn load(source: &CredentialSource) -> Result<Self, StoreError> {
        match source {
            CredentialSource::Inline(json) => Self::parse(json),
            CredentialSource::File(path) => {
                let json = tokio::fs::read_to_string(path).await.map_err(|e| {
                    StoreError::Unavailable(format!("read {}: {}", path.display(), e))
                })?;
                Self::parse(&json)
            }
            CredentialSource::Emulator { .. } => Err(StoreError::Unavailable(
                "the emulator does not use a service account key".into(),
            )),
        }
    }
}
