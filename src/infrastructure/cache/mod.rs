pub mod cache_keys;
pub mod in_memory;
pub mod redis;

use crate::core::errors::WalletGateError;
use crate::core::models::BalanceRecord;
use async_trait::async_trait;
use std::time::Duration;

/// Balance cache shared by every server instance.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the record for `address` if present and unexpired.
    async fn get_balance(&self, address: &str) -> Result<Option<BalanceRecord>, WalletGateError>;

    async fn save_balance(&self, record: &BalanceRecord, ttl: Duration) -> Result<(), WalletGateError>;
}
