//! Login rate limiting.
//!
//! Attempts are counted per normalized username, so one user being guessed
//! at does not lock out the others.

use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Tracked usernames above which stale entries are dropped on the next check.
pub const PRUNE_THRESHOLD: usize = 10_000;

pub struct LoginRateLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
    per_minute: u32,
    prune_threshold: usize,
}

impl LoginRateLimiter {
    /// Returns `None` when `per_minute` is 0 (limiting disabled).
    pub fn new(per_minute: u32) -> Option<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute)?);
        Some(Self::with_quota(quota, per_minute, PRUNE_THRESHOLD))
    }

    fn with_quota(quota: Quota, per_minute: u32, prune_threshold: usize) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            per_minute,
            prune_threshold,
        }
    }

    /// Counts one attempt for `username`.
    ///
    /// Returns the number of seconds to wait when the quota is exhausted.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let key = shared::validation::normalize_username(username);
        let result = self.limiter.check_key(&key).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        });

        if self.limiter.len() >= self.prune_threshold {
            self.prune();
        }
        result
    }

    /// Drops usernames whose quota has fully recovered.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!(
            before,
            after = self.limiter.len(),
            "Pruned login rate limiter"
        );
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("per_minute", &self.per_minute)
            .field("tracked_keys", &self.limiter.len())
            .field("prune_threshold", &self.prune_threshold)
            .finish()
    }
}
