//! Stale-response discard for insight requests.
//!
//! Every request is tagged with an epoch. Starting a new request advances the
//! epoch, and a response that resolves under an older epoch is dropped.

use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifier of one insight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Result of a request that was allowed to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    /// The request is still the latest one.
    Fresh(String),
    /// A newer request started while this one was in flight.
    Stale,
}

/// Monotonic epoch counter shared by everyone issuing insight requests.
#[derive(Debug, Default)]
pub struct EpochGuard {
    current: AtomicU64,
}

impl EpochGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one.
    pub fn begin(&self) -> Epoch {
        Epoch(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.current.load(Ordering::SeqCst) == epoch.0
    }

    /// Await `request` and keep its response only if `epoch` is still current.
    pub async fn resolve<F>(&self, epoch: Epoch, request: F) -> Result<InsightOutcome>
    where
        F: Future<Output = Result<String>>,
    {
        let response = request.await?;

        if self.is_current(epoch) {
            Ok(InsightOutcome::Fresh(response))
        } else {
            debug!(epoch = epoch.value(), "discarding stale insight response");
            Ok(InsightOutcome::Stale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epochs_increase() {
        let guard = EpochGuard::new();
        let first = guard.begin();
        let second = guard.begin();

        assert!(second > first);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_fresh_response_is_kept() {
        let guard = EpochGuard::new();
        let epoch = guard.begin();

        let outcome =
            tokio_test::block_on(guard.resolve(epoch, async { Ok("insight".to_string()) }))
                .unwrap();
        assert_eq!(outcome, InsightOutcome::Fresh("insight".to_string()));
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let guard = EpochGuard::new();
        let old = guard.begin();

        let outcome = tokio_test::block_on(guard.resolve(old, async {
            // Inputs change while the request is in flight.
            guard.begin();
            Ok("outdated".to_string())
        }))
        .unwrap();

        assert_eq!(outcome, InsightOutcome::Stale);
    }

    #[test]
    fn test_request_error_propagates() {
        let guard = EpochGuard::new();
        let epoch = guard.begin();

        let result = tokio_test::block_on(
            guard.resolve(epoch, async { Err(anyhow::anyhow!("connection refused")) }),
        );
        assert!(result.is_err());
    }
}
