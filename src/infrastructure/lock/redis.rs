use crate::core::errors::WalletGateError;
use crate::infrastructure::lock::{DistributedLock, LockLease};
use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;
use std::time::Duration;
use uuid::Uuid;

// Compare-and-delete so a holder whose lease expired cannot drop someone else's.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct RedisLock {
    conn: ConnectionManager,
}

impl RedisLock {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisLock { conn }
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn try_acquire(&self, name: &str, lease: Duration) -> Result<Option<LockLease>, WalletGateError> {
        let token = Uuid::new_v4().to_string();
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(name)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(lease.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| WalletGateError::LockError(format!("Redis SET NX failed for {}: {}", name, e)))?;
        Ok(reply.map(|_| LockLease {
            name: name.to_string(),
            token,
        }))
    }

    async fn release(&self, lease: &LockLease) -> Result<bool, WalletGateError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(&lease.name)
            .arg(&lease.token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| WalletGateError::LockError(format!("Redis release failed for {}: {}", lease.name, e)))?;
        Ok(deleted == 1)
    }
}
