//! Per-address stampede protection on top of a [`DistributedLock`].
//!
//! Acquisition and the decision about what to do when it fails are kept
//! apart: [`acquire_with_retry`] only reports what happened, and
//! [`LockPolicy`] decides whether resolution may continue without a lease.

use crate::core::errors::WalletGateError;
use crate::infrastructure::lock::{DistributedLock, LockLease, wallet_lock_key};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    pub lease: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        LockSettings {
            lease: Duration::from_secs(3),
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug)]
pub enum LockAcquisition {
    Acquired(LockLease),
    AcquisitionFailed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockPolicy {
    /// Resolve anyway. A missed lock costs at most a redundant upstream call.
    #[default]
    FailOpen,
    /// Report the address as failed instead of resolving it unlocked.
    FailClosed,
}

impl LockPolicy {
    pub fn on_acquisition_failed(self, name: &str, reason: &str) -> Result<(), WalletGateError> {
        match self {
            LockPolicy::FailOpen => {
                warn!(lock = name, reason, "failed to acquire lock, continuing unlocked");
                Ok(())
            }
            LockPolicy::FailClosed => {
                warn!(lock = name, reason, "failed to acquire lock, giving up");
                Err(WalletGateError::LockUnavailable(name.to_string()))
            }
        }
    }
}

/// Tries up to `max_attempts` times, sleeping `retry_delay` between attempts.
pub async fn acquire_with_retry<L>(lock: &L, name: &str, settings: &LockSettings) -> LockAcquisition
where
    L: DistributedLock + ?Sized,
{
    let attempts = settings.max_attempts.max(1);
    let mut reason = String::new();
    for attempt in 1..=attempts {
        match lock.try_acquire(name, settings.lease).await {
            Ok(Some(lease)) => return LockAcquisition::Acquired(lease),
            Ok(None) => reason = "held by another owner".to_string(),
            Err(e) => reason = e.to_string(),
        }
        debug!(lock = name, attempt, "lock attempt failed");
        if attempt < attempts {
            tokio::time::sleep(settings.retry_delay).await;
        }
    }
    LockAcquisition::AcquisitionFailed(reason)
}

pub struct StampedeGuard<L: ?Sized> {
    lock: Arc<L>,
    settings: LockSettings,
    policy: LockPolicy,
}

impl<L> StampedeGuard<L>
where
    L: DistributedLock + ?Sized,
{
    pub fn new(lock: Arc<L>, settings: LockSettings, policy: LockPolicy) -> Self {
        StampedeGuard { lock, settings, policy }
    }

    /// Runs `body` while holding `lock:<address>`.
    ///
    /// The lease is released once `body` finishes, whatever its outcome.
    /// Release failures are logged and never change the returned value.
    pub async fn with_lock<T, F>(&self, address: &str, body: F) -> Result<T, WalletGateError>
    where
        F: Future<Output = Result<T, WalletGateError>>,
    {
        let name = wallet_lock_key(address);
        let lease = match acquire_with_retry(&*self.lock, &name, &self.settings).await {
            LockAcquisition::Acquired(lease) => Some(lease),
            LockAcquisition::AcquisitionFailed(reason) => {
                self.policy.on_acquisition_failed(&name, &reason)?;
                None
            }
        };

        let outcome = body.await;

        if let Some(lease) = lease {
            self.release(lease).await;
        }
        outcome
    }

    async fn release(&self, lease: LockLease) {
        match self.lock.release(&lease).await {
            Ok(true) => debug!(lock = %lease.name, "lock released"),
            Ok(false) => warn!(lock = %lease.name, "lease expired before release"),
            Err(e) => warn!(lock = %lease.name, error = %e, "failed to release lock"),
        }
    }
}
