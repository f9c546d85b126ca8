use axum::http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use walletgate::{
    api::{AppState, api_routes, openapi::ApiDoc, rate_limit::RateLimiter},
    auth::{ApiKeyRegistry, InMemoryApiKeyStore, spawn_refresh_task},
    config::CONFIG,
    core::services::{BalanceService, DynBalanceService},
    infrastructure::{
        cache::{Cache, in_memory::InMemoryCache, redis::RedisCache},
        lock::{DistributedLock, in_memory::InMemoryLock, redis::RedisLock},
        provider::{BalanceProvider, solana_rpc::SolanaRpcProvider},
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&CONFIG.log_level))
        .init();
    info!(config = ?*CONFIG, "starting walletgate");

    // Shared cache and lock; Redis when configured so every instance sees the same state
    let (cache, lock): (Arc<dyn Cache>, Arc<dyn DistributedLock>) = match &CONFIG.redis_url {
        Some(url) => {
            let conn = walletgate::infrastructure::cache::redis::connect(url).await?;
            (Arc::new(RedisCache::new(conn.clone())), Arc::new(RedisLock::new(conn)))
        }
        None => {
            warn!("REDIS_URL not set, using process-local cache and lock");
            (Arc::new(InMemoryCache::new()), Arc::new(InMemoryLock::new()))
        }
    };
    let provider: Arc<dyn BalanceProvider> = Arc::new(SolanaRpcProvider::new(&CONFIG.rpc_url, CONFIG.rpc_timeout)?);
    let service: Arc<DynBalanceService> =
        Arc::new(BalanceService::new(cache, lock, provider, CONFIG.engine_settings()));

    // API keys: full load, then incremental refresh in the background
    let key_store = Arc::new(InMemoryApiKeyStore::with_keys(CONFIG.api_keys.iter().cloned()));
    let api_keys = Arc::new(ApiKeyRegistry::new(key_store));
    api_keys.load_all().await?;
    spawn_refresh_task(api_keys.clone(), CONFIG.api_key_refresh);

    let state = AppState {
        service,
        api_keys,
        rate_limiter: Arc::new(RateLimiter::new(CONFIG.rate_limit_max, CONFIG.rate_limit_window)),
    };

    let app = api_routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
