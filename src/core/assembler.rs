use crate::core::errors::WalletGateError;
use crate::core::models::{BatchResult, CacheStatus, Resolution};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Folds per-address outcomes into a [`BatchResult`].
///
/// Owned by the coordinator alone; units hand their outcomes back instead
/// of writing into shared maps.
pub struct BatchAssembler {
    balances: HashMap<String, Decimal>,
    errors: HashMap<String, String>,
    all_from_cache: bool,
}

impl BatchAssembler {
    pub fn with_capacity(capacity: usize) -> Self {
        BatchAssembler {
            balances: HashMap::with_capacity(capacity),
            errors: HashMap::new(),
            all_from_cache: true,
        }
    }

    pub fn record(&mut self, address: &str, outcome: Result<Resolution, WalletGateError>) {
        match outcome {
            Ok(resolution) => {
                self.all_from_cache &= resolution.from_cache;
                self.balances.insert(address.to_string(), resolution.amount);
            }
            Err(e) => {
                self.all_from_cache = false;
                self.balances.insert(address.to_string(), Decimal::ZERO);
                self.errors.insert(address.to_string(), e.to_string());
            }
        }
    }

    pub fn finish(self) -> BatchResult {
        BatchResult {
            balances: self.balances,
            errors: self.errors,
            cache_status: CacheStatus::from_all_cached(self.all_from_cache),
        }
    }
}
