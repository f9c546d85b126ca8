use crate::core::errors::WalletGateError;
use crate::core::models::BalanceRecord;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::cache::cache_keys::wallet_balance_key;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Opens a reconnecting connection shared by [`RedisCache`] and the Redis lock.
pub async fn connect(url: &str) -> Result<ConnectionManager, WalletGateError> {
    let client = redis::Client::open(url).map_err(|e| WalletGateError::CacheError(format!("Invalid Redis URL: {}", e)))?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| WalletGateError::CacheError(format!("Redis connection failed: {}", e)))
}

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisCache { conn }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_balance(&self, address: &str) -> Result<Option<BalanceRecord>, WalletGateError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(wallet_balance_key(address))
            .await
            .map_err(|e| WalletGateError::CacheError(format!("Redis GET failed: {}", e)))?;
        raw.map(|value| serde_json::from_str(&value))
            .transpose()
            .map_err(|e| WalletGateError::CacheError(format!("Cache deserialization failed: {}", e)))
    }

    async fn save_balance(&self, record: &BalanceRecord, ttl: Duration) -> Result<(), WalletGateError> {
        let serialized = serde_json::to_string(record)
            .map_err(|e| WalletGateError::CacheError(format!("Cache serialization failed: {}", e)))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(wallet_balance_key(&record.address), serialized, ttl.as_secs().max(1))
            .await
            .map_err(|e| WalletGateError::CacheError(format!("Redis SET failed: {}", e)))?;
        Ok(())
    }
}
