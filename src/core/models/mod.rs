pub mod balance;

pub use balance::{BalanceRecord, BatchResult, CacheStatus, LAMPORTS_PER_SOL, Resolution, lamports_to_sol};
