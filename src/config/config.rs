use crate::core::locking::{LockPolicy, LockSettings};
use crate::core::services::EngineSettings;
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub redis_url: Option<String>,
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub max_concurrency: usize,
    pub cache_ttl: Duration,
    pub lock_lease: Duration,
    pub lock_max_attempts: u32,
    pub lock_retry_delay: Duration,
    pub api_keys: Vec<String>,
    pub api_key_refresh: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<redacted>"))
            .field("rpc_url", &"<redacted>")
            .field("rpc_timeout", &self.rpc_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .field("cache_ttl", &self.cache_ttl)
            .field("lock_lease", &self.lock_lease)
            .field("lock_max_attempts", &self.lock_max_attempts)
            .field("lock_retry_delay", &self.lock_retry_delay)
            .field("api_keys", &format!("<{} redacted>", self.api_keys.len()))
            .field("api_key_refresh", &self.api_key_refresh)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window", &self.rate_limit_window)
            .finish()
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: parsed("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            rpc_url: env::var("RPC_CLIENT_URL").unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),
            rpc_timeout: Duration::from_secs(parsed("RPC_TIMEOUT_SECS", 10)),
            max_concurrency: parsed("MAX_CONCURRENCY", 50),
            cache_ttl: Duration::from_secs(parsed("CACHE_TTL_SECS", 10)),
            lock_lease: Duration::from_millis(parsed("LOCK_LEASE_MS", 3000)),
            lock_max_attempts: parsed("LOCK_MAX_ATTEMPTS", 3),
            lock_retry_delay: Duration::from_millis(parsed("LOCK_RETRY_DELAY_MS", 200)),
            api_keys: env::var("API_KEYS")
                .map(|v| split_keys(&v))
                .unwrap_or_default(),
            api_key_refresh: Duration::from_secs(parsed("API_KEY_REFRESH_SECS", 60)),
            rate_limit_max: parsed("RATE_LIMIT_MAX", 10),
            rate_limit_window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS", 60)),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_concurrency: self.max_concurrency,
            cache_ttl: self.cache_ttl,
            lock: LockSettings {
                lease: self.lock_lease,
                max_attempts: self.lock_max_attempts,
                retry_delay: self.lock_retry_delay,
            },
            lock_policy: LockPolicy::FailOpen,
        }
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
