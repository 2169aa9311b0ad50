//! Reconnect policy.
//!
//! Attempt `n` (1-based) waits `base_delay * 2^(n-1)`. With the defaults
//! that is 1s, 2s, 4s, 8s, 16s, after which the client gives up.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default reconnect budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first reconnect.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

// ============================================================================
// ReconnectPolicy
// ============================================================================

/// Exponential backoff with a fixed attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum consecutive reconnect attempts.
    pub max_attempts: u32,
    /// Delay before the first attempt.
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Creates a policy.
    #[inline]
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that never reconnects.
    #[inline]
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, DEFAULT_BASE_DELAY)
    }

    /// Delay before 1-based attempt `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Delay for the next attempt given `attempts_so_far`, or `None` once
    /// the budget is spent.
    #[must_use]
    pub fn next_delay(&self, attempts_so_far: u32) -> Option<Duration> {
        (attempts_so_far < self.max_attempts).then(|| self.delay_for(attempts_so_far + 1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_default_schedule() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (0..6)
            .map_while(|n| policy.next_delay(n))
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
        assert_eq!(policy.next_delay(5), None);
    }

    #[test]
    fn test_disabled() {
        assert_eq!(ReconnectPolicy::disabled().next_delay(0), None);
    }

    #[test]
    fn test_delay_saturates() {
        let policy = ReconnectPolicy::new(u32::MAX, Duration::from_secs(1));
        assert_eq!(policy.delay_for(200), Duration::from_secs(1).saturating_mul(u32::MAX));
    }

    proptest! {
        #[test]
        fn prop_delays_double(base_ms in 1u64..5000, attempt in 1u32..16) {
            let policy = ReconnectPolicy::new(32, Duration::from_millis(base_ms));
            prop_assert_eq!(policy.delay_for(attempt + 1), policy.delay_for(attempt) * 2);
        }

        #[test]
        fn prop_budget_respected(max in 0u32..10, so_far in 0u32..20) {
            let policy = ReconnectPolicy::new(max, Duration::from_millis(10));
            prop_assert_eq!(policy.next_delay(so_far).is_some(), so_far < max);
        }
    }
}
