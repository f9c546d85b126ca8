//! Batch wallet balance resolution behind a shared, time-bounded cache.
//!
//! - [`core`] - the resolution engine: per-address resolver, lock wrapper,
//!   batch coordinator and response assembler
//! - [`infrastructure`] - cache, distributed lock and upstream provider backends
//! - [`auth`] - API key registry with periodic refresh
//! - [`api`] - HTTP surface
//! - [`config`] - environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::WalletGateError;
pub use crate::core::services::{BalanceService, DynBalanceService, EngineSettings};

#[cfg(test)]
mod tests;
