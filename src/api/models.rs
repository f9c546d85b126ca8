use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::core::errors::WalletGateError;
use crate::core::models::BatchResult;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

#[derive(Deserialize, Serialize, ToSchema)]
pub struct GetBalanceRequest {
    /// Wallet addresses to resolve. Duplicates are allowed.
    #[serde(default)]
    pub wallets: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct GetBalanceResponse {
    /// Balance in SOL per address; zero for addresses that failed.
    #[schema(value_type = HashMap<String, f64>)]
    pub wallets: HashMap<String, Decimal>,
    pub errors: HashMap<String, String>,
}

impl From<BatchResult> for GetBalanceResponse {
    fn from(result: BatchResult) -> Self {
        GetBalanceResponse {
            wallets: result.balances,
            errors: result.errors,
        }
    }
}

// Error response struct
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for WalletGateError to implement IntoResponse
pub struct ApiError(pub WalletGateError);

impl From<WalletGateError> for ApiError {
    fn from(err: WalletGateError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self.0 {
            WalletGateError::EmptyBatch => (StatusCode::BAD_REQUEST, "No wallets provided".to_string()),
            WalletGateError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request format".to_string()),
            WalletGateError::MissingApiKey => (StatusCode::UNAUTHORIZED, "API key is required".to_string()),
            WalletGateError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Invalid or inactive API key".to_string()),
            WalletGateError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            WalletGateError::InvalidAddress(address) => {
                (StatusCode::BAD_REQUEST, format!("Invalid wallet address: {}", address))
            }
            WalletGateError::ProviderError(msg) => (StatusCode::BAD_GATEWAY, format!("Upstream provider error: {}", msg)),
            WalletGateError::LockUnavailable(name) => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("Lock {} unavailable", name))
            }
            WalletGateError::CacheError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Cache error: {}", msg)),
            WalletGateError::LockError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Lock error: {}", msg)),
            WalletGateError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", msg),
            ),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
