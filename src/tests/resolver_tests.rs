use crate::core::errors::WalletGateError;
use crate::core::models::BalanceRecord;
use crate::core::resolver::BalanceResolver;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::tests::{BrokenCache, FakeProvider, wait_for_cached};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(10);

#[tokio::test]
async fn cached_address_never_reaches_provider() {
    let cache = Arc::new(InMemoryCache::new());
    cache
        .save_balance(&BalanceRecord::new("A", Decimal::new(5, 0)), TTL)
        .await
        .unwrap();
    let provider = Arc::new(FakeProvider::new().with_balance("A", 9_000_000_000));
    let resolver = BalanceResolver::new(cache, provider.clone(), TTL);

    let resolution = resolver.resolve("A").await.unwrap();

    assert!(resolution.from_cache);
    assert_eq!(resolution.amount, Decimal::new(5, 0));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn miss_fetches_and_populates_cache() {
    let cache = Arc::new(InMemoryCache::new());
    let provider = Arc::new(FakeProvider::new().with_balance("B", 2_500_000_000));
    let resolver = BalanceResolver::new(cache.clone(), provider.clone(), TTL);

    let resolution = resolver.resolve("B").await.unwrap();
    assert!(!resolution.from_cache);
    assert_eq!(resolution.amount, Decimal::new(25, 1));

    let record = wait_for_cached(&cache, "B").await;
    assert_eq!(record.address, "B");
    assert_eq!(record.amount, Decimal::new(25, 1));

    let again = resolver.resolve("B").await.unwrap();
    assert!(again.from_cache);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_failure_is_returned_and_not_cached() {
    let cache = Arc::new(InMemoryCache::new());
    let provider = Arc::new(FakeProvider::new().failing("X", "node is behind"));
    let resolver = BalanceResolver::new(cache.clone(), provider, TTL);

    let result = resolver.resolve("X").await;
    assert!(matches!(result, Err(WalletGateError::ProviderError(msg)) if msg == "node is behind"));

    tokio::task::yield_now().await;
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn cache_outage_degrades_to_live_fetch() {
    let provider = Arc::new(FakeProvider::new().with_balance("A", 1_000_000_000));
    let resolver = BalanceResolver::new(Arc::new(BrokenCache), provider.clone(), TTL);

    let first = resolver.resolve("A").await.unwrap();
    let second = resolver.resolve("A").await.unwrap();

    assert_eq!(first.amount, Decimal::ONE);
    assert!(!second.from_cache);
    assert_eq!(provider.calls(), 2);
}
