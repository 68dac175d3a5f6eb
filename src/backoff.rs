use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter, matching the retry policy the endpoint
/// session applies to retryable HTTP errors: `min(initial * 2^(attempt), max)`,
/// randomized within 0-10% above the computed interval.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// `attempt` is 0-indexed: the delay before the first retry.
    pub fn interval(&self, attempt: u32) -> Duration {
        let multiplier = 2f64.powi(attempt as i32);
        let base = self.initial.mul_f64(multiplier).min(self.max);
        jitter(base)
    }
}

fn jitter(base: Duration) -> Duration {
    let mut rng = rand::rng();
    let factor = rng.random_range(0.0..=0.10);
    base.mul_f64(1.0 + factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_attempt_is_close_to_initial() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
        let interval = backoff.interval(0);
        assert!(interval >= Duration::from_secs(1));
        assert!(interval <= Duration::from_millis(1100));
    }

    #[test]
    fn interval_grows_exponentially_until_capped() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
        assert!(backoff.interval(4) >= Duration::from_secs(16));
        assert!(backoff.interval(10) <= Duration::from_millis(33_000));
    }

    #[test]
    fn never_exceeds_max_plus_jitter_headroom() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
        for attempt in 0..20 {
            assert!(backoff.interval(attempt) <= Duration::from_millis(33_000));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Whatever `initial`/`max`/`attempt` are fed in, the jittered interval
        /// never falls below the uncapped base and never exceeds `max * 1.10`.
        #[test]
        fn interval_always_within_base_and_jittered_cap(
            initial_ms in 1u64..5_000,
            max_ms in 5_000u64..120_000,
            attempt in 0u32..40,
        ) {
            let initial = Duration::from_millis(initial_ms);
            let max = Duration::from_millis(max_ms);
            let backoff = Backoff::new(initial, max);

            let base = initial.mul_f64(2f64.powi(attempt as i32)).min(max);
            let interval = backoff.interval(attempt);

            prop_assert!(interval >= base);
            prop_assert!(interval <= max.mul_f64(1.10) + Duration::from_millis(1));
        }

        /// Once the exponential growth reaches `max`, every later attempt keeps
        /// producing an interval in the same `[max, max * 1.10]` jitter band.
        #[test]
        fn interval_stays_capped_once_max_is_reached(
            initial_ms in 1u64..1_000,
            max_ms in 1_000u64..10_000,
            attempt_after_cap in 0u32..10,
        ) {
            let initial = Duration::from_millis(initial_ms);
            let max = Duration::from_millis(max_ms);
            let backoff = Backoff::new(initial, max);

            // Find the first attempt at which the uncapped exponential exceeds max.
            let mut attempt = 0u32;
            while initial.mul_f64(2f64.powi(attempt as i32)) < max && attempt < 63 {
                attempt += 1;
            }
            let capped_attempt = attempt + attempt_after_cap;

            let interval = backoff.interval(capped_attempt);
            prop_assert!(interval >= max);
            prop_assert!(interval <= max.mul_f64(1.10) + Duration::from_millis(1));
        }
    }
}
