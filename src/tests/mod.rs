mod resolver_tests;

use crate::core::errors::WalletGateError;
use crate::core::locking::LockSettings;
use crate::core::models::BalanceRecord;
use crate::core::services::{BalanceService, EngineSettings};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::lock::in_memory::InMemoryLock;
use crate::infrastructure::lock::{DistributedLock, LockLease};
use crate::infrastructure::provider::BalanceProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Provider with canned answers that records how it was called.
#[derive(Default)]
pub struct FakeProvider {
    balances: HashMap<String, u64>,
    failures: HashMap<String, String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, address: &str, lamports: u64) -> Self {
        self.balances.insert(address.to_string(), lamports);
        self
    }

    pub fn failing(mut self, address: &str, message: &str) -> Self {
        self.failures.insert(address.to_string(), message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceProvider for FakeProvider {
    async fn get_balance(&self, address: &str) -> Result<u64, WalletGateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.failures.get(address) {
            return Err(WalletGateError::ProviderError(message.clone()));
        }
        self.balances
            .get(address)
            .copied()
            .ok_or_else(|| WalletGateError::ProviderError(format!("no balance for {}", address)))
    }
}

/// Cache whose backend is always down.
pub struct BrokenCache;

#[async_trait]
impl Cache for BrokenCache {
    async fn get_balance(&self, _address: &str) -> Result<Option<BalanceRecord>, WalletGateError> {
        Err(WalletGateError::CacheError("connection refused".to_string()))
    }

    async fn save_balance(&self, _record: &BalanceRecord, _ttl: Duration) -> Result<(), WalletGateError> {
        Err(WalletGateError::CacheError("connection refused".to_string()))
    }
}

/// Lock that is always held by somebody else.
#[derive(Default)]
pub struct BusyLock {
    attempts: AtomicUsize,
}

impl BusyLock {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistributedLock for BusyLock {
    async fn try_acquire(&self, _name: &str, _lease: Duration) -> Result<Option<LockLease>, WalletGateError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn release(&self, _lease: &LockLease) -> Result<bool, WalletGateError> {
        Ok(false)
    }
}

pub fn test_settings() -> EngineSettings {
    EngineSettings {
        lock: LockSettings {
            lease: Duration::from_secs(3),
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
        },
        ..EngineSettings::default()
    }
}

pub fn create_test_service(
    cache: Arc<InMemoryCache>,
    provider: Arc<FakeProvider>,
) -> BalanceService<InMemoryCache, InMemoryLock, FakeProvider> {
    BalanceService::new(cache, Arc::new(InMemoryLock::new()), provider, test_settings())
}

pub fn wallets(addresses: &[&str]) -> Vec<String> {
    addresses.iter().map(|a| a.to_string()).collect()
}

/// Waits for the detached cache write that follows a live fetch.
pub async fn wait_for_cached(cache: &InMemoryCache, address: &str) -> BalanceRecord {
    for _ in 0..100 {
        if let Some(record) = cache.get_balance(address).await.unwrap() {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never reached the cache", address);
}
