pub mod solana_rpc;

use crate::core::errors::WalletGateError;
use async_trait::async_trait;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Source of truth for wallet balances. One address per call.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Current balance of `address` in lamports.
    async fn get_balance(&self, address: &str) -> Result<u64, WalletGateError>;
}

/// Rejects strings that cannot be a base58-encoded 32-byte public key.
pub fn validate_address(address: &str) -> Result<(), WalletGateError> {
    let plausible_length = (32..=44).contains(&address.len());
    if plausible_length && address.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        Ok(())
    } else {
        Err(WalletGateError::InvalidAddress(address.to_string()))
    }
}
