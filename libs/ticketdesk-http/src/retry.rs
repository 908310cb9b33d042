use crate::config::ExponentialBackoff;
use rand::Rng;
use std::time::Duration;

/// Upper bound on any computed delay; nothing a dashboard does should wait longer.
const MAX_BACKOFF_SECS: f64 = 60.0;

/// Delay before retry number `attempt` (0-based).
///
/// Non-finite or negative inputs fall back to safe values instead of panicking
/// inside `Duration::from_secs_f64`.
pub(crate) fn backoff_delay(backoff: &ExponentialBackoff, attempt: usize) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);

    let multiplier = if backoff.multiplier.is_finite() && backoff.multiplier >= 0.0 {
        backoff.multiplier
    } else {
        1.0
    };
    let max_secs = backoff.max.as_secs_f64().min(MAX_BACKOFF_SECS);

    let raw = backoff.initial.as_secs_f64() * multiplier.powi(exponent);
    let secs = if raw.is_finite() {
        raw.clamp(0.0, max_secs)
    } else {
        max_secs
    };
    let delay = Duration::from_secs_f64(secs);

    let delay = if backoff.jitter {
        let factor = rand::rng().random_range(0.0..=0.25);
        delay + delay.mul_f64(factor)
    } else {
        delay
    };

    delay.min(Duration::from_secs_f64(max_secs))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_exponentially() {
        let backoff = ExponentialBackoff {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
        };

        assert_eq!(backoff_delay(&backoff, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(&backoff, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(&backoff, 3), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let backoff = ExponentialBackoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(2),
            multiplier: 10.0,
            jitter: true,
        };

        for attempt in 0..8 {
            assert!(backoff_delay(&backoff, attempt) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_backoff_survives_bad_multiplier() {
        let backoff = ExponentialBackoff {
            multiplier: f64::NAN,
            jitter: false,
            ..ExponentialBackoff::fast()
        };

        assert_eq!(backoff_delay(&backoff, 5), Duration::from_millis(1));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let backoff = ExponentialBackoff {
            initial: Duration::from_millis(400),
            max: Duration::from_secs(10),
            multiplier: 1.0,
            jitter: true,
        };

        for _ in 0..32 {
            let delay = backoff_delay(&backoff, 0);
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(500));
        }
    }
}
