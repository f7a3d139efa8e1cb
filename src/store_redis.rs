#[cfg(feature = "redis")]
use std::sync::Arc;

#[cfg(feature = "redis")]
use async_trait::async_trait;
#[cfg(feature = "redis")]
use redis::AsyncCommands;

#[cfg(feature = "redis")]
use crate::error::StoreError;
#[cfg(feature = "redis")]
use crate::store::{credential_key, now_secs, CredentialStore, InMemoryStore};
#[cfg(feature = "redis")]
use crate::types::{AppFid, Fid, NotificationCredential};

/// Connection settings for the remote key-value backend.
#[cfg(feature = "redis")]
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Connection URL, e.g. `redis://host:6379` or `rediss://host`.
    pub url: String,

    /// Access token, injected as the password component when the URL
    /// does not already carry credentials.
    pub token: Option<String>,
}

#[cfg(feature = "redis")]
impl KvConfig {
    /// Read connection settings from `KV_URL` / `KV_TOKEN`.
    ///
    /// Returns `None` when no remote store is configured, which selects
    /// the in-memory fallback in [`select_store`].
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("KV_URL").ok()?;
        let token = std::env::var("KV_TOKEN").ok();
        Some(Self { url, token })
    }
}

/// Credential store backed by a Redis-protocol key-value server.
///
/// Records are stored as JSON under `"{prefix}:{fid}-{appFid}"`.
#[cfg(feature = "redis")]
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
}

#[cfg(feature = "redis")]
impl RedisStore {
    pub fn new(client: redis::Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &KvConfig, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(authenticated_url(&config.url, config.token.as_deref()))
            .map_err(|err| StoreError::Unavailable {
                detail: err.to_string(),
            })?;
        Ok(Self::new(client, prefix))
    }

    fn record_key(&self, fid: Fid, app_fid: AppFid) -> String {
        format!("{}:{}", self.prefix, credential_key(fid, app_fid))
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| StoreError::Unavailable {
                detail: err.to_string(),
            })
    }
}

#[cfg(feature = "redis")]
fn authenticated_url(url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) if !url.contains('@') => {
            let (scheme, rest) = url.split_once("://").unwrap_or(("redis", url));
            format!("{}://:{}@{}", scheme, token, rest)
        }
        _ => url.to_string(),
    }
}

#[cfg(feature = "redis")]
#[async_trait]
impl CredentialStore for RedisStore {
    async fn get(
        &self,
        fid: Fid,
        app_fid: AppFid,
    ) -> Result<Option<NotificationCredential>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(self.record_key(fid, app_fid))
            .await
            .map_err(|err| StoreError::Unavailable {
                detail: err.to_string(),
            })?;

        match value {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|err| StoreError::Decode {
                    detail: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        fid: Fid,
        app_fid: AppFid,
        url: &str,
        token: &str,
    ) -> Result<(), StoreError> {
        let record = NotificationCredential {
            url: url.to_string(),
            token: token.to_string(),
            updated_at_secs: now_secs(),
        };
        let json = serde_json::to_string(&record).map_err(|err| StoreError::Decode {
            detail: err.to_string(),
        })?;

        let mut conn = self.connection().await?;
        // SET replaces the whole value in one command; a concurrent GET
        // sees either the old record or the new one, never a mix.
        let _: () = conn
            .set(self.record_key(fid, app_fid), json)
            .await
            .map_err(|err| StoreError::Unavailable {
                detail: err.to_string(),
            })?;
        Ok(())
    }

    async fn delete(&self, fid: Fid, app_fid: AppFid) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        // DEL on an absent key is a server-side no-op.
        let _: () = conn
            .del(self.record_key(fid, app_fid))
            .await
            .map_err(|err| StoreError::Unavailable {
                detail: err.to_string(),
            })?;
        Ok(())
    }
}

/// One-time backend selection at process startup.
///
/// A configured remote store wins; otherwise the process-local map is
/// used. The choice is fixed for the process lifetime: `set`/`delete`
/// failures against the remote store propagate instead of falling back
/// to the local map.
#[cfg(feature = "redis")]
pub fn select_store(
    config: Option<KvConfig>,
    prefix: impl Into<String>,
) -> Result<Arc<dyn CredentialStore>, StoreError> {
    match config {
        Some(config) => Ok(Arc::new(RedisStore::from_config(&config, prefix)?)),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(all(test, feature = "redis"))]
mod tests {
    use super::*;

    #[test]
    fn token_becomes_url_password() {
        assert_eq!(
            authenticated_url("redis://kv.example:6379", Some("s3cret")),
            "redis://:s3cret@kv.example:6379"
        );
        assert_eq!(
            authenticated_url("rediss://kv.example", Some("s3cret")),
            "rediss://:s3cret@kv.example"
        );
    }

    #[test]
    fn existing_credentials_win_over_token() {
        assert_eq!(
            authenticated_url("redis://user:pw@kv.example", Some("s3cret")),
            "redis://user:pw@kv.example"
        );
    }

    #[test]
    fn url_without_token_is_untouched() {
        assert_eq!(
            authenticated_url("redis://kv.example:6379", None),
            "redis://kv.example:6379"
        );
    }
}
