use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::{AppFid, Fid, NotificationCredential};

/// Composite key for one user/app credential record.
///
/// Fids are canonical non-negative integers rendered without leading
/// zeros, so distinct pairs can never collide once concatenated.
pub fn credential_key(fid: Fid, app_fid: AppFid) -> String {
    format!("{}-{}", fid, app_fid)
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Keyed storage for notification credentials.
///
/// Absence of a record is the only "notifications disabled" signal and
/// is a normal value, never an error. Backend selection happens once at
/// process startup and is fixed for the process lifetime.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential for one `(fid, appFid)` pair.
    async fn get(
        &self,
        fid: Fid,
        app_fid: AppFid,
    ) -> Result<Option<NotificationCredential>, StoreError>;

    /// Idempotent overwrite of the full record; stamps `updated_at_secs`.
    async fn set(
        &self,
        fid: Fid,
        app_fid: AppFid,
        url: &str,
        token: &str,
    ) -> Result<(), StoreError>;

    /// Idempotent; deleting an absent key is a no-op.
    async fn delete(&self, fid: Fid, app_fid: AppFid) -> Result<(), StoreError>;
}

/// In-memory store for development and single-process fallback.
///
/// All records are lost on process restart. Use the remote backend for
/// anything that must survive a redeploy or run on more than one
/// instance.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<String, NotificationCredential>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn get(
        &self,
        fid: Fid,
        app_fid: AppFid,
    ) -> Result<Option<NotificationCredential>, StoreError> {
        let guard = self.records.lock().await;
        Ok(guard.get(&credential_key(fid, app_fid)).cloned())
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

        // Whole-record insert: a concurrent get never observes a
        // half-written credential.
        self.records
            .lock()
            .await
            .insert(credential_key(fid, app_fid), record);
        Ok(())
    }

    async fn delete(&self, fid: Fid, app_fid: AppFid) -> Result<(), StoreError> {
        self.records.lock().await.remove(&credential_key(fid, app_fid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_fid_dash_app_fid() {
        assert_eq!(credential_key(Fid(12), AppFid(3)), "12-3");
        assert_eq!(credential_key(Fid(3), AppFid(12)), "3-12");
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryStore::new();
        store
            .set(Fid(42), AppFid(7), "https://client.example/notify", "tok-1")
            .await
            .expect("set");

        let record = store
            .get(Fid(42), AppFid(7))
            .await
            .expect("get")
            .expect("credential present");
        assert_eq!(record.url, "https://client.example/notify");
        assert_eq!(record.token, "tok-1");
    }

    #[tokio::test]
    async fn overwrite_leaves_only_the_second_token() {
        let store = InMemoryStore::new();
        store
            .set(Fid(1), AppFid(2), "https://a.example/notify", "first")
            .await
            .expect("set");
        store
            .set(Fid(1), AppFid(2), "https://b.example/notify", "second")
            .await
            .expect("set");

        let record = store
            .get(Fid(1), AppFid(2))
            .await
            .expect("get")
            .expect("credential present");
        assert_eq!(record.url, "https://b.example/notify");
        assert_eq!(record.token, "second");
    }

    #[tokio::test]
    async fn absent_pair_reads_as_none() {
        let store = InMemoryStore::new();
        let record = store.get(Fid(9), AppFid(9)).await.expect("get");
        assert_eq!(record, None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();
        store.delete(Fid(5), AppFid(5)).await.expect("delete absent");

        store
            .set(Fid(5), AppFid(5), "https://c.example/notify", "tok")
            .await
            .expect("set");
        store.delete(Fid(5), AppFid(5)).await.expect("delete");
        store.delete(Fid(5), AppFid(5)).await.expect("delete again");

        assert_eq!(store.get(Fid(5), AppFid(5)).await.expect("get"), None);
    }

    #[tokio::test]
    async fn pairs_do_not_alias() {
        let store = InMemoryStore::new();
        store
            .set(Fid(1), AppFid(23), "https://a.example", "a")
            .await
            .expect("set");
        store
            .set(Fid(12), AppFid(3), "https://b.example", "b")
            .await
            .expect("set");

        let a = store.get(Fid(1), AppFid(23)).await.expect("get").expect("a");
        let b = store.get(Fid(12), AppFid(3)).await.expect("get").expect("b");
        assert_eq!(a.token, "a");
        assert_eq!(b.token, "b");
    }
}
