use crate::core::errors::WalletGateError;
use crate::infrastructure::provider::{BalanceProvider, validate_address};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug)]
pub struct RpcResponse {
    pub result: Option<RpcBalanceResult>,
    pub error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
pub struct RpcBalanceResult {
    pub value: u64,
}

#[derive(Deserialize, Debug)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// `getBalance` over Solana JSON-RPC at finalized commitment.
pub struct SolanaRpcProvider {
    client: reqwest::Client,
    url: String,
}

impl SolanaRpcProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WalletGateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletGateError::ProviderError(format!("Failed to build RPC client: {}", e)))?;
        Ok(SolanaRpcProvider {
            client,
            url: url.into(),
        })
    }
}

pub fn balance_from_response(response: RpcResponse) -> Result<u64, WalletGateError> {
    match response {
        RpcResponse {
            result: Some(result), ..
        } => Ok(result.value),
        RpcResponse { error: Some(error), .. } => Err(WalletGateError::ProviderError(format!(
            "RPC error {}: {}",
            error.code, error.message
        ))),
        _ => Err(WalletGateError::ProviderError("Empty RPC response".to_string())),
    }
}

#[async_trait]
impl BalanceProvider for SolanaRpcProvider {
    async fn get_balance(&self, address: &str) -> Result<u64, WalletGateError> {
        validate_address(address)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address, { "commitment": "finalized" }],
        });
        debug!(address, "fetching balance from RPC");
        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WalletGateError::ProviderError(format!("RPC request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| WalletGateError::ProviderError(format!("Malformed RPC response: {}", e)))?;
        balance_from_response(response)
    }
}
