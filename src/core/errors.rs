use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum WalletGateError {
    #[error("No wallets provided")]
    EmptyBatch,
    #[error("Invalid request format: {0}")]
    InvalidRequest(String),
    #[error("API key is required")]
    MissingApiKey,
    #[error("Invalid or inactive API key")]
    InvalidApiKey,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("Upstream provider error: {0}")]
    ProviderError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Lock error: {0}")]
    LockError(String),
    /// Raised only under the fail-closed lock policy.
    #[error("Lock {0} unavailable")]
    LockUnavailable(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}
