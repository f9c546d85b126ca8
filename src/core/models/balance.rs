use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// A balance observed for one wallet. Never mutated after construction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub address: String,
    pub amount: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl BalanceRecord {
    pub fn new(address: impl Into<String>, amount: Decimal) -> Self {
        BalanceRecord {
            address: address.into(),
            amount,
            observed_at: Utc::now(),
        }
    }

    pub fn from_lamports(address: impl Into<String>, lamports: u64) -> Self {
        Self::new(address, lamports_to_sol(lamports))
    }
}

/// Converts a raw lamport quantity to SOL using decimal arithmetic.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

/// Outcome of resolving a single address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub amount: Decimal,
    pub from_cache: bool,
}

impl Resolution {
    pub fn cached(amount: Decimal) -> Self {
        Resolution {
            amount,
            from_cache: true,
        }
    }

    pub fn fetched(amount: Decimal) -> Self {
        Resolution {
            amount,
            from_cache: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn from_all_cached(all_from_cache: bool) -> Self {
        if all_from_cache { CacheStatus::Hit } else { CacheStatus::Miss }
    }

    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub balances: HashMap<String, Decimal>,
    pub errors: HashMap<String, String>,
    pub cache_status: CacheStatus,
}
