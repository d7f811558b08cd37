//! Reconnect backoff policy.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

/// Exponential backoff with a bounded maximum and optional jitter.
///
/// `delay` is a pure function of the attempt number; randomness is only
/// introduced by `jittered`, which takes the RNG as an argument.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay before the first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Growth factor per attempt
    pub multiplier: u32,
    /// Upper bound of any single delay (milliseconds)
    pub max_delay_ms: u64,
    /// Fraction of the delay that may be shaved off at random, in `[0, 1]`
    pub jitter: f64,
    /// Consecutive failures after which live delivery is reported as lost
    pub max_consecutive_failures: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            multiplier: 2,
            max_delay_ms: 30_000,
            jitter: 0.5,
            max_consecutive_failures: 8,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (0-indexed), without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(attempt);
        let millis = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }

    /// The capped delay used once live delivery has been given up.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Spread `delay` uniformly over `[delay * (1 - jitter), delay]`.
    pub fn jittered<R: Rng + ?Sized>(&self, delay: Duration, rng: &mut R) -> Duration {
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }

        let upper = delay.as_secs_f64();
        let lower = upper * (1.0 - jitter);
        Duration::from_secs_f64(rng.random_range(lower..=upper))
    }
}
