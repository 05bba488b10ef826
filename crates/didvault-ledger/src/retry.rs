//! Timeout and retry policy for ledger lookups.
//!
//! [`RetryingLedger`] bounds each attempt with a timeout and retries
//! transient failures with exponential backoff. Callers only ever see a
//! reply or [`LedgerError::Unavailable`].

use std::time::Duration;

use async_trait::async_trait;
use didvault_core::DidValue;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, warn};

use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, LedgerEntry};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Deadline of a single attempt.
    pub attempt_timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Backoff base in milliseconds; the n-th delay is `base^n` ms.
    pub base_delay_ms: u64,
    /// Upper bound on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(5),
            max_retries: 3,
            base_delay_ms: 10,
            max_delay: Duration::from_secs(2),
        }
    }
}

/// A ledger client wrapper adding timeouts and retries.
#[derive(Debug)]
pub struct RetryingLedger<L> {
    inner: L,
    config: RetryConfig,
}

impl<L: Ledger> RetryingLedger<L> {
    pub fn new(inner: L, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    async fn attempt(&self, did: &DidValue) -> Result<LedgerEntry> {
        let deadline = self.config.attempt_timeout;
        match tokio::time::timeout(deadline, self.inner.lookup(did)).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(deadline)),
        }
    }
}

#[async_trait]
impl<L: Ledger> Ledger for RetryingLedger<L> {
    async fn lookup(&self, did: &DidValue) -> Result<LedgerEntry> {
        let strategy = ExponentialBackoff::from_millis(self.config.base_delay_ms)
            .max_delay(self.config.max_delay)
            .take(self.config.max_retries);

        let result = RetryIf::spawn(
            strategy,
            || self.attempt(did),
            |e: &LedgerError| {
                let transient = e.is_transient();
                if transient {
                    warn!(did = %did, error = %e, "ledger lookup failed, retrying");
                }
                transient
            },
        )
        .await;

        match result {
            Ok(entry) => Ok(entry),
            Err(e) if e.is_transient() => {
                debug!(did = %did, error = %e, "ledger lookup gave up");
                Err(LedgerError::Unavailable(format!(
                    "{} attempts failed, last error: {}",
                    self.config.max_retries + 1,
                    e
                )))
            }
            Err(e) => Err(e),
        }
    }
}
