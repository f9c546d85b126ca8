use crate::core::assembler::BatchAssembler;
use crate::core::errors::WalletGateError;
use crate::core::locking::{LockPolicy, LockSettings, StampedeGuard};
use crate::core::models::{BatchResult, Resolution};
use crate::core::resolver::BalanceResolver;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::lock::DistributedLock;
use crate::infrastructure::provider::BalanceProvider;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Resolutions allowed in flight at once within one batch.
    pub max_concurrency: usize,
    pub cache_ttl: Duration,
    pub lock: LockSettings,
    pub lock_policy: LockPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_concurrency: 50,
            cache_ttl: Duration::from_secs(10),
            lock: LockSettings::default(),
            lock_policy: LockPolicy::FailOpen,
        }
    }
}

pub type DynBalanceService = BalanceService<dyn Cache, dyn DistributedLock, dyn BalanceProvider>;

/// Batch coordinator: fans a list of addresses out to bounded concurrent
/// resolutions and folds the outcomes back into one [`BatchResult`].
pub struct BalanceService<C: ?Sized, L: ?Sized, P: ?Sized> {
    resolver: Arc<BalanceResolver<C, P>>,
    guard: Arc<StampedeGuard<L>>,
    max_concurrency: usize,
}

impl<C: ?Sized, L: ?Sized, P: ?Sized> Clone for BalanceService<C, L, P> {
    fn clone(&self) -> Self {
        BalanceService {
            resolver: Arc::clone(&self.resolver),
            guard: Arc::clone(&self.guard),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl<C, L, P> BalanceService<C, L, P>
where
    C: Cache + ?Sized + 'static,
    L: DistributedLock + ?Sized + 'static,
    P: BalanceProvider + ?Sized + 'static,
{
    pub fn new(cache: Arc<C>, lock: Arc<L>, provider: Arc<P>, settings: EngineSettings) -> Self {
        info!(
            max_concurrency = settings.max_concurrency,
            cache_ttl_secs = settings.cache_ttl.as_secs(),
            lock_policy = ?settings.lock_policy,
            "Initializing BalanceService"
        );
        BalanceService {
            resolver: Arc::new(BalanceResolver::new(cache, provider, settings.cache_ttl)),
            guard: Arc::new(StampedeGuard::new(lock, settings.lock, settings.lock_policy)),
            max_concurrency: settings.max_concurrency.max(1),
        }
    }

    /// Resolves every address in `addresses`, duplicates included.
    ///
    /// Per-address failures end up in `errors` with a zero balance; only an
    /// empty request fails the call as a whole.
    pub async fn resolve_batch(&self, addresses: &[String]) -> Result<BatchResult, WalletGateError> {
        if addresses.is_empty() {
            return Err(WalletGateError::EmptyBatch);
        }

        // One gate per batch, dropped with it.
        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let units = addresses
            .iter()
            .map(|address| {
                let resolver = Arc::clone(&self.resolver);
                let guard = Arc::clone(&self.guard);
                let gate = Arc::clone(&gate);
                let address = address.clone();
                tokio::spawn(async move { resolve_unit(resolver, guard, gate, address).await })
            })
            .collect::<Vec<_>>();

        let outcomes = join_all(units).await;

        let mut assembler = BatchAssembler::with_capacity(addresses.len());
        for (address, joined) in addresses.iter().zip(outcomes) {
            let outcome = joined.unwrap_or_else(|e| {
                error!(address = %address, error = %e, "resolution task aborted");
                Err(WalletGateError::InternalServerError(format!("Resolution task failed: {}", e)))
            });
            assembler.record(address, outcome);
        }
        let result = assembler.finish();

        info!(
            requested = addresses.len(),
            resolved = result.balances.len(),
            failed = result.errors.len(),
            cache = result.cache_status.as_header_value(),
            "batch resolved"
        );
        Ok(result)
    }
}

/// Gate slot first, then the lock. The slot is returned as soon as the
/// resolver finishes, before the lease is released.
async fn resolve_unit<C, L, P>(
    resolver: Arc<BalanceResolver<C, P>>,
    guard: Arc<StampedeGuard<L>>,
    gate: Arc<Semaphore>,
    address: String,
) -> Result<Resolution, WalletGateError>
where
    C: Cache + ?Sized + 'static,
    L: DistributedLock + ?Sized,
    P: BalanceProvider + ?Sized,
{
    let permit = gate
        .acquire_owned()
        .await
        .map_err(|e| WalletGateError::InternalServerError(format!("Concurrency gate closed: {}", e)))?;

    guard
        .with_lock(&address, async {
            let outcome = resolver.resolve(&address).await;
            drop(permit);
            outcome
        })
        .await
}
