//! Manager configuration.

use std::time::Duration;

/// How long a cached peer key or endpoint is trusted without asking the
/// ledger again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub ttl: Duration,
}

impl FreshnessPolicy {
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Whether an entry resolved at `resolved_at` is still fresh at `now`
    /// (both Unix ms).
    pub fn is_fresh(&self, resolved_at: i64, now: i64) -> bool {
        let age = now.saturating_sub(resolved_at);
        i128::from(age) < self.ttl.as_millis() as i128
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }
}

/// What `create_and_store_my_did` does with an explicit DID that is already
/// owned under a different verkey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DidCollisionPolicy {
    /// Re-key the existing record, keeping its metadata.
    #[default]
    Overwrite,
    /// Fail with `AlreadyExists`.
    Reject,
}

/// Configuration for the manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Cache freshness for peer keys and endpoints.
    pub freshness: FreshnessPolicy,
    /// Explicit-DID collision handling.
    pub collision_policy: DidCollisionPolicy,
    /// Maximum number of requests the dispatcher runs at once.
    pub worker_pool_size: usize,
}

impl ManagerConfig {
    pub fn with_freshness_ttl(mut self, ttl: Duration) -> Self {
        self.freshness = FreshnessPolicy::new(ttl);
        self
    }

    pub fn with_collision_policy(mut self, policy: DidCollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            freshness: FreshnessPolicy::default(),
            collision_policy: DidCollisionPolicy::Overwrite,
            worker_pool_size: 8,
        }
    }
}
