use crate::core::errors::WalletGateError;
use crate::core::models::{BalanceRecord, Resolution};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::provider::BalanceProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-aside lookup of a single wallet balance.
pub struct BalanceResolver<C: ?Sized, P: ?Sized> {
    cache: Arc<C>,
    provider: Arc<P>,
    ttl: Duration,
}

impl<C, P> BalanceResolver<C, P>
where
    C: Cache + ?Sized + 'static,
    P: BalanceProvider + ?Sized,
{
    pub fn new(cache: Arc<C>, provider: Arc<P>, ttl: Duration) -> Self {
        BalanceResolver { cache, provider, ttl }
    }

    /// Serves `address` from the cache when possible, otherwise asks the
    /// provider and schedules a cache write without waiting for it.
    ///
    /// A cache read failure counts as a miss.
    pub async fn resolve(&self, address: &str) -> Result<Resolution, WalletGateError> {
        match self.cache.get_balance(address).await {
            Ok(Some(record)) => {
                debug!(address, "cache hit");
                return Ok(Resolution::cached(record.amount));
            }
            Ok(None) => debug!(address, "cache miss"),
            Err(e) => warn!(address, error = %e, "cache read failed, treating as miss"),
        }

        let lamports = self.provider.get_balance(address).await.inspect_err(|e| {
            warn!(address, error = %e, "provider failed to return balance");
        })?;
        let record = BalanceRecord::from_lamports(address, lamports);
        let amount = record.amount;
        self.store_detached(record);
        Ok(Resolution::fetched(amount))
    }

    /// Fire-and-forget cache write. Errors only reach the log.
    fn store_detached(&self, record: BalanceRecord) {
        let cache = Arc::clone(&self.cache);
        let ttl = self.ttl;
        tokio::spawn(async move {
            if let Err(e) = cache.save_balance(&record, ttl).await {
                warn!(address = %record.address, error = %e, "failed to write balance to cache");
            }
        });
    }
}
