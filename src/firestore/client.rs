use std::time::Duration as StdDuration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::auth::TokenSource;
use super::credentials::ServiceAccountKey;
use super::value::{self, BALANCE_FIELD, LAST_MINE_FIELD};
use crate::accounts::repo::UserStore;
use crate::accounts::repo_types::{UserAccount, UserDocument};
use crate::config::CredentialSource;
use crate::error::StoreError;

const API_BASE: &str = "https://firestore.googleapis.com/v1";
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// The emulator accepts this fixed bearer token as an admin credential.
const EMULATOR_TOKEN: &str = "owner";

enum Auth {
    ServiceAccount(TokenSource),
    Emulator,
}

/// User records in a Firestore collection, over the REST API.
pub struct FirestoreStore {
    http: Client,
    auth: Auth,
    project_id: String,
    collection_url: String,
}

impl FirestoreStore {
    /// Load credentials and prove they work by fetching a first access token.
    pub async fn connect(source: &CredentialSource, collection: &str) -> Result<Self, StoreError> {
        if let CredentialSource::Emulator { host, project_id } = source {
            return Self::emulator(&format!("http://{}/v1", host), project_id, collection);
        }

        let key = ServiceAccountKey::load(source).await?;
        let http = http_client()?;
        let tokens = TokenSource::new(http.clone(), &key)?;
        tokens.access_token().await?;

        Ok(Self {
            http,
            auth: Auth::ServiceAccount(tokens),
            collection_url: collection_url(API_BASE, &key.project_id, collection),
            project_id: key.project_id,
        })
    }

    /// Store served by a Firestore emulator rooted at `base_url` (`http://host:port/v1`).
    pub fn emulator(base_url: &str, project_id: &str, collection: &str) -> Result<Self, StoreError> {
        Ok(Self {
            http: http_client()?,
            auth: Auth::Emulator,
            collection_url: collection_url(base_url, project_id, collection),
            project_id: project_id.to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn document_url(&self, user_id: &str) -> String {
        format!("{}/{}", self.collection_url, user_id)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, StoreError> {
        let token = match &self.auth {
            Auth::ServiceAccount(tokens) => tokens.access_token().await?,
            Auth::Emulator => EMULATOR_TOKEN.to_string(),
        };
        Ok(req.bearer_auth(token).send().await?)
    }

    async fn get_document(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError> {
        let resp = self.send(self.http.get(self.document_url(user_id))).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = ok_json(resp).await?;
        value::decode(user_id, &body).map(Some)
    }

    /// `Ok(false)` when another request created the document first.
    async fn create_document(&self, user_id: &str, doc: &UserDocument) -> Result<bool, StoreError> {
        let req = self
            .http
            .post(&self.collection_url)
            .query(&[("documentId", user_id)])
            .json(&value::encode(doc));
        let resp = self.send(req).await?;
        if resp.status() == StatusCode::CONFLICT {
            return Ok(false);
        }
        ok_json(resp).await?;
        Ok(true)
    }
}

#[async_trait]
impl UserStore for FirestoreStore {
    #[instrument(skip(self))]
    async fn fetch_or_initialize(&self, user_id: &str) -> Result<UserAccount, StoreError> {
        if let Some(doc) = self.get_document(user_id).await? {
            return doc.into_account(user_id);
        }

        let fresh = UserAccount::default();
        if self
            .create_document(user_id, &UserDocument::try_from(&fresh)?)
            .await?
        {
            info!(%user_id, "user record created");
            return Ok(fresh);
        }

        debug!(%user_id, "user record created concurrently; reading it back");
        self.get_document(user_id)
            .await?
            .ok_or_else(|| StoreError::Unavailable(format!("user {user_id} vanished after create")))?
            .into_account(user_id)
    }

    #[instrument(skip(self))]
    async fn apply_mine(
        &self,
        user_id: &str,
        new_balance: f64,
        now: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let doc = UserDocument::try_from(&UserAccount {
            balance: new_balance,
            last_mine_at: now,
        })?;
        let req = self
            .http
            .patch(self.document_url(user_id))
            .query(&[
                ("updateMask.fieldPaths", BALANCE_FIELD),
                ("updateMask.fieldPaths", LAST_MINE_FIELD),
                ("currentDocument.exists", "true"),
            ])
            .json(&value::encode(&doc));
        ok_json(self.send(req).await?).await?;
        Ok(())
    }
}

fn http_client() -> Result<Client, StoreError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(StoreError::unavailable)
}

fn collection_url(base_url: &str, project_id: &str, collection: &str) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents/{}",
        base_url.trim_end_matches('/'),
        project_id,
        collection
    )
}

async fn ok_json(resp: Response) -> Result<Value, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    warn!(%status, body = %body, "firestore returned error");
    Err(StoreError::Unavailable(format!("firestore returned {}", status)))
}
