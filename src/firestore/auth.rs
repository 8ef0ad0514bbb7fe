use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use super::credentials::ServiceAccountKey;
use crate::error::StoreError;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL: Duration = Duration::hours(1);
/// Tokens are renewed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,   // service account email
    pub scope: String, // requested OAuth scope
    pub aud: String,   // token endpoint
    pub iat: i64,      // issued at (unix timestamp)
    pub exp: i64,      // expires at (unix timestamp)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: OffsetDateTime,
}

pub fn assertion_claims(
    client_email: &str,
    token_uri: &str,
    now: OffsetDateTime,
) -> AssertionClaims {
    AssertionClaims {
        iss: client_email.into(),
        scope: DATASTORE_SCOPE.into(),
        aud: token_uri.into(),
        iat: now.unix_timestamp(),
        exp: (now + ASSERTION_TTL).unix_timestamp(),
    }
}

/// OAuth2 access tokens for one service account, cached until near expiry.
pub struct TokenSource {
    http: Client,
    encoding: EncodingKey,
    key_id: Option<String>,
    client_email: String,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(http: Client, key: &ServiceAccountKey) -> Result<Self, StoreError> {
        let encoding = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Unavailable(format!("invalid private key: {}", e)))?;
        Ok(Self {
            http,
            encoding,
            key_id: key.private_key_id.clone(),
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            cached: Mutex::new(None),
        })
    }

    fn sign_assertion(&self, now: OffsetDateTime) -> Result<String, StoreError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        let claims = assertion_claims(&self.client_email, &self.token_uri, now);
        encode(&header, &claims, &self.encoding)
            .map_err(|e| StoreError::Unavailable(format!("sign assertion: {}", e)))
    }

    /// A bearer token valid for at least [`EXPIRY_MARGIN`].
    pub async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.cached.lock().await;
        let now = OffsetDateTime::now_utc();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.sign_assertion(now)?;
        let resp = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = resp.json().await?;
        debug!(
            client_email = %self.client_email,
            expires_in = token.expires_in,
            "access token refreshed"
        );

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn key(private_key: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: "p".into(),
            client_email: "bot@p.iam.gserviceaccount.com".into(),
            private_key: private_key.into(),
            private_key_id: Some("kid".into()),
            token_uri: "https://oauth2.googleapis.com/token".into(),
        }
    }

    #[test]
    fn rejects_non_pem_private_key() {
        let err = TokenSource::new(Client::new(), &key("not a pem")).err().unwrap();
        assert!(err.to_string().contains("invalid private key"));
    }

    #[test]
    fn assertion_claims_cover_one_hour() {
        let claims = assertion_claims(
            "bot@p.iam.gserviceaccount.com",
            "https://oauth2.googleapis.com/token",
            datetime!(2025-01-01 0:00 UTC),
        );
        assert_eq!(claims.iss, "bot@p.iam.gserviceaccount.com");
        assert_eq!(claims.iat, 1_735_689_600);
        assert_eq!(claims.exp, datetime!(2025-01-01 1:00 UTC).unix_timestamp());

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["scope"], "https://www.googleapis.com/auth/datastore");
        assert_eq!(json["aud"], "https://oauth2.googleapis.com/token");
    }
}
