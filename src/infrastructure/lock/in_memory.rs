use crate::core::errors::WalletGateError;
use crate::infrastructure::lock::{DistributedLock, LockLease};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Lease table for single-instance deployments and tests.
#[derive(Default)]
pub struct InMemoryLock {
    leases: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryLock {
    pub fn new() -> Self {
        InMemoryLock {
            leases: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_held(&self, name: &str) -> bool {
        let leases = self.leases.lock().await;
        leases.get(name).is_some_and(|(_, expiry)| *expiry > Instant::now())
    }
}

#[async_trait]
impl DistributedLock for InMemoryLock {
    async fn try_acquire(&self, name: &str, lease: Duration) -> Result<Option<LockLease>, WalletGateError> {
        let mut leases = self.leases.lock().await;
        let now = Instant::now();
        if leases.get(name).is_some_and(|(_, expiry)| *expiry > now) {
            return Ok(None);
        }
        let token = Uuid::new_v4().to_string();
        leases.insert(name.to_string(), (token.clone(), now + lease));
        Ok(Some(LockLease {
            name: name.to_string(),
            token,
        }))
    }

    async fn release(&self, lease: &LockLease) -> Result<bool, WalletGateError> {
        let mut leases = self.leases.lock().await;
        match leases.get(&lease.name) {
            Some((token, expiry)) if *token == lease.token => {
                let live = *expiry > Instant::now();
                leases.remove(&lease.name);
                Ok(live)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn second_owner_is_refused_until_release() {
        let lock = InMemoryLock::new();
        let first = lock.try_acquire("lock:a", LEASE).await.unwrap().unwrap();
        assert!(lock.try_acquire("lock:a", LEASE).await.unwrap().is_none());
        assert!(lock.try_acquire("lock:b", LEASE).await.unwrap().is_some());

        assert!(lock.release(&first).await.unwrap());
        assert!(lock.try_acquire("lock:a", LEASE).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lease_can_be_taken_over() {
        let lock = InMemoryLock::new();
        let stale = lock.try_acquire("lock:a", LEASE).await.unwrap().unwrap();
        tokio::time::advance(LEASE).await;

        let fresh = lock.try_acquire("lock:a", LEASE).await.unwrap().unwrap();
        assert_ne!(stale.token, fresh.token);
        // The previous holder must not be able to drop the new owner's lease.
        assert!(!lock.release(&stale).await.unwrap());
        assert!(lock.is_held("lock:a").await);
    }
}
