pub mod in_memory;
pub mod redis;

use crate::core::errors::WalletGateError;
use async_trait::async_trait;
use std::time::Duration;

pub fn wallet_lock_key(address: &str) -> String {
    format!("lock:{}", address)
}

/// Lease granted by a [`DistributedLock`]. Owned by the unit that acquired it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    pub name: String,
    /// Unique token for this acquisition; only the holder can release it.
    pub token: String,
}

#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Single acquisition attempt. `Ok(None)` means another owner holds the lease.
    async fn try_acquire(&self, name: &str, lease: Duration) -> Result<Option<LockLease>, WalletGateError>;

    /// Returns `false` when the lease had already expired or changed hands.
    async fn release(&self, lease: &LockLease) -> Result<bool, WalletGateError>;
}
