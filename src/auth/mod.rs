pub mod api_keys;

pub use api_keys::{ApiKeyRecord, ApiKeyRegistry, ApiKeyStore, InMemoryApiKeyStore, spawn_refresh_task};
