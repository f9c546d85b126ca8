//! API key registry.
//!
//! Keys live in a backing [`ApiKeyStore`]. The registry keeps an in-process
//! copy of the active set: a full load at startup, then periodic incremental
//! refreshes of records updated since the last sync.

use crate::core::errors::WalletGateError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub key: String,
    pub active: bool,
    pub last_updated: DateTime<Utc>,
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Every currently active key.
    async fn load_active(&self) -> Result<Vec<ApiKeyRecord>, WalletGateError>;

    /// Records, active or not, updated strictly after `since`.
    async fn fetch_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<ApiKeyRecord>, WalletGateError>;
}

#[derive(Default)]
pub struct InMemoryApiKeyStore {
    records: RwLock<HashMap<String, ApiKeyRecord>>,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        InMemoryApiKeyStore {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let now = Utc::now();
        let records = keys
            .into_iter()
            .map(|k| {
                let key = k.into();
                let record = ApiKeyRecord {
                    key: key.clone(),
                    active: true,
                    last_updated: now,
                };
                (key, record)
            })
            .collect();
        InMemoryApiKeyStore {
            records: RwLock::new(records),
        }
    }

    pub async fn upsert(&self, record: ApiKeyRecord) {
        self.records.write().await.insert(record.key.clone(), record);
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn load_active(&self) -> Result<Vec<ApiKeyRecord>, WalletGateError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| r.active).cloned().collect())
    }

    async fn fetch_updated_since(&self, since: DateTime<Utc>) -> Result<Vec<ApiKeyRecord>, WalletGateError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| r.last_updated > since).cloned().collect())
    }
}

#[derive(Default)]
struct KeySet {
    keys: HashSet<String>,
    last_sync: Option<DateTime<Utc>>,
}

impl KeySet {
    fn advance(&mut self, seen: DateTime<Utc>) {
        if self.last_sync.is_none_or(|last| seen > last) {
            self.last_sync = Some(seen);
        }
    }
}

pub struct ApiKeyRegistry {
    store: Arc<dyn ApiKeyStore>,
    state: RwLock<KeySet>,
}

impl ApiKeyRegistry {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        ApiKeyRegistry {
            store,
            state: RwLock::new(KeySet::default()),
        }
    }

    /// Replaces the in-process key set with every active key in the store.
    pub async fn load_all(&self) -> Result<usize, WalletGateError> {
        let records = self.store.load_active().await?;
        let mut fresh = KeySet::default();
        for record in records {
            fresh.advance(record.last_updated);
            fresh.keys.insert(record.key);
        }
        let loaded = fresh.keys.len();
        *self.state.write().await = fresh;
        info!(keys = loaded, "loaded API keys");
        Ok(loaded)
    }

    /// Applies store changes since the last sync. Returns how many records changed.
    pub async fn refresh(&self) -> Result<usize, WalletGateError> {
        let since = self.state.read().await.last_sync;
        let Some(since) = since else {
            return self.load_all().await;
        };

        let updates = self.store.fetch_updated_since(since).await?;
        let changed = updates.len();
        let mut state = self.state.write().await;
        for record in updates {
            state.advance(record.last_updated);
            if record.active {
                state.keys.insert(record.key);
            } else {
                state.keys.remove(&record.key);
            }
        }
        debug!(changed, "refreshed API keys");
        Ok(changed)
    }

    pub async fn is_valid_key(&self, key: &str) -> bool {
        self.state.read().await.keys.contains(key)
    }
}

/// Polls the store every `every`. Failures are logged and retried on the next tick.
pub fn spawn_refresh_task(registry: Arc<ApiKeyRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; the initial load already happened.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = registry.refresh().await {
                error!(error = %e, "error fetching updated API keys");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn record(key: &str, active: bool, at: DateTime<Utc>) -> ApiKeyRecord {
        ApiKeyRecord {
            key: key.to_string(),
            active,
            last_updated: at,
        }
    }

    #[tokio::test]
    async fn initial_load_only_includes_active_keys() {
        let t0 = Utc::now();
        let store = Arc::new(InMemoryApiKeyStore::new());
        store.upsert(record("live", true, t0)).await;
        store.upsert(record("dead", false, t0)).await;

        let registry = ApiKeyRegistry::new(store);
        assert_eq!(registry.load_all().await.unwrap(), 1);
        assert!(registry.is_valid_key("live").await);
        assert!(!registry.is_valid_key("dead").await);
        assert!(!registry.is_valid_key("").await);
    }

    #[tokio::test]
    async fn refresh_applies_incremental_changes() {
        let t0 = Utc::now();
        let store = Arc::new(InMemoryApiKeyStore::new());
        store.upsert(record("a", true, t0)).await;
        store.upsert(record("b", true, t0)).await;

        let registry = ApiKeyRegistry::new(store.clone());
        registry.load_all().await.unwrap();

        let t1 = t0 + TimeDelta::seconds(1);
        store.upsert(record("a", false, t1)).await;
        store.upsert(record("c", true, t1)).await;

        assert_eq!(registry.refresh().await.unwrap(), 2);
        assert!(!registry.is_valid_key("a").await);
        assert!(registry.is_valid_key("b").await);
        assert!(registry.is_valid_key("c").await);

        // Nothing newer than the last sync.
        assert_eq!(registry.refresh().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn refresh_before_any_load_does_a_full_load() {
        let store = Arc::new(InMemoryApiKeyStore::with_keys(["k1", "k2"]));
        let registry = ApiKeyRegistry::new(store);
        assert_eq!(registry.refresh().await.unwrap(), 2);
        assert!(registry.is_valid_key("k2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_picks_up_new_keys() {
        let t0 = Utc::now();
        let store = Arc::new(InMemoryApiKeyStore::new());
        store.upsert(record("a", true, t0)).await;
        let registry = Arc::new(ApiKeyRegistry::new(store.clone()));
        registry.load_all().await.unwrap();

        let task = spawn_refresh_task(registry.clone(), Duration::from_secs(60));
        store.upsert(record("late", true, t0 + TimeDelta::seconds(5))).await;
        assert!(!registry.is_valid_key("late").await);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(registry.is_valid_key("late").await);
        task.abort();
    }
}
