use std::{
    fmt,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

pub const DEFAULT_KEY_FILE: &str = "firebase-key.json";
pub const DEFAULT_USERS_COLLECTION: &str = "users";
pub const DEFAULT_EMULATOR_PROJECT: &str = "chillminer-local";

/// Where the service-account key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// JSON blob taken verbatim from `FIREBASE_CONFIG`.
    Inline(String),
    /// Key file on local disk.
    File(PathBuf),
    /// Local Firestore emulator (`FIRESTORE_EMULATOR_HOST`); no key needed.
    Emulator { host: String, project_id: String },
}

impl CredentialSource {
    /// The inline blob wins over the key file; neither is an error.
    pub fn resolve(inline: Option<String>, key_file: &Path) -> Result<Self, ConfigError> {
        match inline.filter(|v| !v.trim().is_empty()) {
            Some(json) => Ok(CredentialSource::Inline(json)),
            None if key_file.is_file() => Ok(CredentialSource::File(key_file.to_path_buf())),
            None => Err(ConfigError::MissingCredentials(
                key_file.display().to_string(),
            )),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline(<redacted>)"),
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CredentialSource::Emulator { host, project_id } => f
                .debug_struct("Emulator")
                .field("host", host)
                .field("project_id", project_id)
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub credentials: CredentialSource,
    pub users_collection: String,
    pub health_addr: Option<SocketAddr>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"<redacted>")
            .field("credentials", &self.credentials)
            .field("users_collection", &self.users_collection)
            .field("health_addr", &self.health_addr)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = var("BOT_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("BOT_TOKEN"))?;

        let credentials = match var("FIRESTORE_EMULATOR_HOST").filter(|v| !v.trim().is_empty()) {
            Some(host) => CredentialSource::Emulator {
                host,
                project_id: var("FIRESTORE_PROJECT_ID")
                    .unwrap_or_else(|| DEFAULT_EMULATOR_PROJECT.into()),
            },
            None => {
                let key_file = var("FIREBASE_KEY_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));
                CredentialSource::resolve(var("FIREBASE_CONFIG"), &key_file)?
            }
        };

        let users_collection = var("USERS_COLLECTION")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USERS_COLLECTION.into());

        let health_addr = match var("APP_PORT").or_else(|| var("PORT")) {
            Some(port) => {
                let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
                let addr = format!("{}:{}", host, port).parse::<SocketAddr>().map_err(|e| {
                    ConfigError::InvalidVar {
                        name: "APP_HOST/APP_PORT",
                        reason: e.to_string(),
                    }
                })?;
                Some(addr)
            }
            None => None,
        };

        Ok(Self {
            bot_token,
            credentials,
            users_collection,
            health_addr,
        })
    }
}
