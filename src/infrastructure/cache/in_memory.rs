use crate::core::errors::WalletGateError;
use crate::core::models::BalanceRecord;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::cache::cache_keys::wallet_balance_key;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Process-local cache, used when no Redis URL is configured and in tests.
///
/// Values are stored serialized, the same way they travel through Redis.
#[derive(Default)]
pub struct InMemoryCache {
    store: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_balance(&self, address: &str) -> Result<Option<BalanceRecord>, WalletGateError> {
        let key = wallet_balance_key(address);
        let store = self.store.read().await;
        match store.get(&key) {
            Some((value, expiry)) if *expiry > Instant::now() => {
                let record = serde_json::from_str(value)
                    .map_err(|e| WalletGateError::CacheError(format!("Cache deserialization failed: {}", e)))?;
                Ok(Some(record))
            }
            Some(_) => {
                drop(store);
                let mut store = self.store.write().await;
                // Re-check under the write lock, a fresh write may have landed.
                if store.get(&key).is_some_and(|(_, expiry)| *expiry <= Instant::now()) {
                    store.remove(&key);
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save_balance(&self, record: &BalanceRecord, ttl: Duration) -> Result<(), WalletGateError> {
        let serialized = serde_json::to_string(record)
            .map_err(|e| WalletGateError::CacheError(format!("Cache serialization failed: {}", e)))?;
        let now = Instant::now();
        let mut store = self.store.write().await;
        // Entries nobody reads again are only dropped here.
        store.retain(|_, (_, expiry)| *expiry > now);
        store.insert(wallet_balance_key(&record.address), (serialized, now + ttl));
        Ok(())
    }
}
