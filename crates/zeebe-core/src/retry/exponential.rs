//! Exponential backoff with jitter, driven by the previous delay.

use super::supplier::BackoffSupplier;
use crate::error::ConfigError;
use rand::Rng;
use std::time::Duration;

/// Exponential backoff supplier with configurable jitter.
///
/// Each delay is the previous delay multiplied by `backoff_factor`, clamped to
/// `[min_delay, max_delay]`, then spread by up to `±jitter_factor` of itself.
///
/// # Mathematical Formula
///
/// ```text
/// candidate = previous == 0 ? min_delay : previous * backoff_factor
/// clamped   = clamp(candidate, min_delay, max_delay)
/// offset    = uniform(-jitter_factor, +jitter_factor)   (open interval)
/// delay     = clamped * (1 + offset)
/// ```
///
/// A jittered delay that would exceed `Duration::MAX` saturates there.
///
/// With `jitter_factor = 0` the sequence obtained by feeding every delay back
/// in starts at `min_delay`, never decreases, and settles exactly on
/// `max_delay` after about `log(max/min) / log(factor)` steps.
///
/// # Examples
///
/// ```rust
/// use zeebe_core::retry::{BackoffSupplier, ExponentialBackoff};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), zeebe_core::ConfigError> {
/// // Defaults: min=50ms, max=5s, factor=1.6, jitter=0.1
/// let backoff = ExponentialBackoff::default();
///
/// let backoff = ExponentialBackoff::builder()
///     .min_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .backoff_factor(2.0)
///     .jitter_factor(0.2)
///     .build()?;
///
/// let mut delay = Duration::ZERO;
/// for _ in 0..5 {
///     delay = backoff.supply_retry_delay(delay);
/// }
/// assert!(delay <= Duration::from_secs(36));
/// # Ok(())
/// # }
/// ```
///
/// # Performance Characteristics
///
/// - **Memory**: O(1), the supplier is a handful of `Copy` fields
/// - **CPU**: O(1) per call, simple arithmetic plus one random draw
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    min_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Default lower bound of the delay.
    pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(50);
    /// Default upper bound of the delay.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
    /// Default growth factor.
    pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.6;
    /// Default relative jitter.
    pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

    /// Create a new builder for configuring exponential backoff.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zeebe_core::retry::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = ExponentialBackoff::builder()
    ///     .max_delay(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(backoff.max_delay(), Duration::from_secs(10));
    /// ```
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Lower bound of the pre-jitter delay.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Upper bound of the pre-jitter delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Growth factor applied to the previous delay.
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Fraction of the delay used as the jitter spread.
    pub fn jitter_factor(&self) -> f64 {
        self.jitter_factor
    }

    /// Computes the clamped delay before jitter is applied.
    ///
    /// A zero `previous` marks the first failure and yields `min_delay`.
    /// Anything at or above `max_delay` saturates.
    pub fn candidate(&self, previous: Duration) -> Duration {
        if previous.is_zero() {
            return self.min_delay;
        }

        let grown = previous.as_secs_f64() * self.backoff_factor;
        if !grown.is_finite() || grown >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }

        Duration::from_secs_f64(grown).clamp(self.min_delay, self.max_delay)
    }

    /// Supplies the next delay, drawing jitter from the given random source.
    ///
    /// Passing a seeded generator makes the sequence reproducible.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use zeebe_core::retry::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = ExponentialBackoff::default();
    /// let a = backoff.supply_retry_delay_with(Duration::ZERO, &mut StdRng::seed_from_u64(7));
    /// let b = backoff.supply_retry_delay_with(Duration::ZERO, &mut StdRng::seed_from_u64(7));
    /// assert_eq!(a, b);
    /// ```
    pub fn supply_retry_delay_with<R>(&self, previous: Duration, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let candidate = self.candidate(previous);
        if self.jitter_factor == 0.0 {
            return candidate;
        }

        // gen::<f64>() is drawn from [0, 1); drop the closed end so the
        // offset stays strictly inside (-jitter, +jitter).
        let unit = loop {
            let unit: f64 = rng.r#gen();
            if unit > 0.0 {
                break unit;
            }
        };
        let offset = (unit * 2.0 - 1.0) * self.jitter_factor;

        self.keep_inside_jitter(candidate, scale(candidate, 1.0 + offset))
    }

    /// Steps a delay that rounded onto a bound of `candidate * (1 ± jitter)`
    /// one nanosecond back toward `candidate`.
    fn keep_inside_jitter(&self, candidate: Duration, delay: Duration) -> Duration {
        const NANO: Duration = Duration::from_nanos(1);

        if delay < candidate && delay <= scale(candidate, 1.0 - self.jitter_factor) {
            (delay + NANO).min(candidate)
        } else if delay > candidate && delay >= scale(candidate, 1.0 + self.jitter_factor) {
            (delay - NANO).max(candidate)
        } else {
            delay
        }
    }
}

/// `delay * factor`, saturating at `Duration::MAX`.
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

impl Default for ExponentialBackoff {
    /// Create an exponential backoff with the client defaults.
    ///
    /// Defaults:
    /// - `min_delay`: 50ms
    /// - `max_delay`: 5s
    /// - `backoff_factor`: 1.6
    /// - `jitter_factor`: 0.1 (±10% randomization)
    fn default() -> Self {
        Self {
            min_delay: Self::DEFAULT_MIN_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            backoff_factor: Self::DEFAULT_BACKOFF_FACTOR,
            jitter_factor: Self::DEFAULT_JITTER_FACTOR,
        }
    }
}

impl BackoffSupplier for ExponentialBackoff {
    fn supply_retry_delay(&self, previous: Duration) -> Duration {
        self.supply_retry_delay_with(previous, &mut rand::thread_rng())
    }
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// Every setter overrides one default; [`build`](Self::build) validates the
/// combination and fails fast on anything the supplier could not honour.
///
/// # Examples
///
/// ```rust
/// use zeebe_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .min_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .backoff_factor(2.0)
///     .jitter_factor(0.1)
///     .build()
///     .unwrap();
///
/// let invalid = ExponentialBackoff::builder().jitter_factor(1.0).build();
/// assert!(invalid.is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ExponentialBackoffBuilder {
    min_delay: Option<Duration>,
    max_delay: Option<Duration>,
    backoff_factor: Option<f64>,
    jitter_factor: Option<f64>,
}

impl ExponentialBackoffBuilder {
    /// Set the delay used after the first failure and the floor of every delay.
    ///
    /// Default: 50ms
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    /// Set the cap on the pre-jitter delay.
    ///
    /// Default: 5s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the growth factor; must be greater than 1.0.
    ///
    /// Default: 1.6
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = Some(factor);
        self
    }

    /// Set the jitter factor; must be within `[0.0, 1.0)`.
    ///
    /// A jitter of 0.2 spreads each delay over ±20% of its value. Zero turns
    /// jitter off and makes the supplier deterministic.
    ///
    /// Default: 0.1
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = Some(factor);
        self
    }

    /// Validate the configuration and build the supplier.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the minimum delay is zero or above the
    /// maximum delay, when the backoff factor is not greater than 1.0, or when
    /// the jitter factor lies outside `[0.0, 1.0)`.
    pub fn build(self) -> Result<ExponentialBackoff, ConfigError> {
        let min_delay = self.min_delay.unwrap_or(ExponentialBackoff::DEFAULT_MIN_DELAY);
        let max_delay = self.max_delay.unwrap_or(ExponentialBackoff::DEFAULT_MAX_DELAY);
        let backoff_factor = self.backoff_factor.unwrap_or(ExponentialBackoff::DEFAULT_BACKOFF_FACTOR);
        let jitter_factor = self.jitter_factor.unwrap_or(ExponentialBackoff::DEFAULT_JITTER_FACTOR);

        if min_delay.is_zero() {
            return Err(ConfigError::ZeroMinDelay);
        }
        if min_delay > max_delay {
            return Err(ConfigError::MinExceedsMax {
                min: min_delay,
                max: max_delay,
            });
        }
        if !backoff_factor.is_finite() || backoff_factor <= 1.0 {
            return Err(ConfigError::InvalidBackoffFactor(backoff_factor));
        }
        if !jitter_factor.is_finite() || !(0.0..1.0).contains(&jitter_factor) {
            return Err(ConfigError::InvalidJitterFactor(jitter_factor));
        }

        Ok(ExponentialBackoff {
            min_delay,
            max_delay,
            backoff_factor,
            jitter_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn feed_back(backoff: &ExponentialBackoff, start: Duration, steps: usize) -> Vec<Duration> {
        let mut delays = vec![backoff.supply_retry_delay(start)];
        for i in 0..steps {
            let next = backoff.supply_retry_delay(delays[i]);
            delays.push(next);
        }
        delays
    }

    #[test]
    fn test_delays_reach_bounds_after_ten_steps() {
        let min_delay = Duration::from_millis(50);
        let max_delay = Duration::from_secs(5);
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.0)
            .min_delay(min_delay)
            .max_delay(max_delay)
            .backoff_factor(1.6)
            .build()
            .unwrap();

        let delays = feed_back(&backoff, Duration::ZERO, 10);

        assert_eq!(delays[0], min_delay);
        assert!(delays[9] < max_delay, "saturated too early: {:?}", delays[9]);
        assert_eq!(delays[10], max_delay);
    }

    #[test]
    fn test_saturated_delays_stay_at_max() {
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.0)
            .build()
            .unwrap();

        let delays = feed_back(&backoff, Duration::ZERO, 40);
        for delay in &delays[10..] {
            assert_eq!(*delay, Duration::from_secs(5));
        }
    }

    #[test]
    fn test_no_jitter_is_non_decreasing() {
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.0)
            .build()
            .unwrap();

        let delays = feed_back(&backoff, Duration::ZERO, 100);
        for pair in delays.windows(2) {
            assert!(pair[1] >= pair[0], "{:?} followed by {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_jitter_stays_strictly_around_max() {
        let max_delay = Duration::from_secs(5);
        let backoff = ExponentialBackoff::builder()
            .max_delay(max_delay)
            .min_delay(Duration::from_millis(50))
            .jitter_factor(0.2)
            .backoff_factor(1.5)
            .build()
            .unwrap();

        let lower = Duration::from_secs(4);
        let upper = Duration::from_secs(6);
        for delay in feed_back(&backoff, max_delay, 100) {
            assert!(
                delay > lower && delay < upper,
                "delay {:?} outside ({:?}, {:?})",
                delay,
                lower,
                upper
            );
        }
    }

    #[test]
    fn test_jitter_varies_delays() {
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.5)
            .build()
            .unwrap();

        let delays: Vec<_> = (0..20)
            .map(|_| backoff.supply_retry_delay(Duration::from_secs(5)))
            .collect();
        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "With randomization, delays should vary");
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let backoff = ExponentialBackoff::default();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let mut prev_a = Duration::ZERO;
        let mut prev_b = Duration::ZERO;
        for _ in 0..20 {
            prev_a = backoff.supply_retry_delay_with(prev_a, &mut a);
            prev_b = backoff.supply_retry_delay_with(prev_b, &mut b);
            assert_eq!(prev_a, prev_b);
        }
    }

    #[test]
    fn test_previous_above_max_is_saturated() {
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.0)
            .build()
            .unwrap();

        assert_eq!(
            backoff.supply_retry_delay(Duration::from_secs(3600)),
            Duration::from_secs(5)
        );
        assert_eq!(backoff.candidate(Duration::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_previous_below_min_is_raised_to_min() {
        let backoff = ExponentialBackoff::builder()
            .jitter_factor(0.0)
            .build()
            .unwrap();

        assert_eq!(
            backoff.supply_retry_delay(Duration::from_millis(1)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder().build().unwrap();

        assert_eq!(backoff.min_delay(), Duration::from_millis(50));
        assert_eq!(backoff.max_delay(), Duration::from_secs(5));
        assert_eq!(backoff.backoff_factor(), 1.6);
        assert_eq!(backoff.jitter_factor(), 0.1);
        assert_eq!(backoff, ExponentialBackoff::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let backoff = ExponentialBackoff::builder()
            .min_delay(Duration::from_millis(200))
            .max_delay(Duration::from_secs(30))
            .backoff_factor(1.5)
            .jitter_factor(0.2)
            .build()
            .unwrap();

        assert_eq!(backoff.min_delay(), Duration::from_millis(200));
        assert_eq!(backoff.max_delay(), Duration::from_secs(30));
        assert_eq!(backoff.backoff_factor(), 1.5);
        assert_eq!(backoff.jitter_factor(), 0.2);
    }

    #[test]
    fn test_equal_min_and_max_is_constant() {
        let backoff = ExponentialBackoff::builder()
            .min_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(1))
            .jitter_factor(0.0)
            .build()
            .unwrap();

        for delay in feed_back(&backoff, Duration::ZERO, 5) {
            assert_eq!(delay, Duration::from_secs(1));
        }
    }

    #[rstest]
    #[case::min_above_max(
        ExponentialBackoff::builder()
            .min_delay(Duration::from_secs(2))
            .max_delay(Duration::from_secs(1)),
        ConfigError::MinExceedsMax { min: Duration::from_secs(2), max: Duration::from_secs(1) }
    )]
    #[case::zero_min(
        ExponentialBackoff::builder().min_delay(Duration::ZERO),
        ConfigError::ZeroMinDelay
    )]
    #[case::factor_one(
        ExponentialBackoff::builder().backoff_factor(1.0),
        ConfigError::InvalidBackoffFactor(1.0)
    )]
    #[case::factor_below_one(
        ExponentialBackoff::builder().backoff_factor(0.5),
        ConfigError::InvalidBackoffFactor(0.5)
    )]
    #[case::factor_infinite(
        ExponentialBackoff::builder().backoff_factor(f64::INFINITY),
        ConfigError::InvalidBackoffFactor(f64::INFINITY)
    )]
    #[case::jitter_one(
        ExponentialBackoff::builder().jitter_factor(1.0),
        ConfigError::InvalidJitterFactor(1.0)
    )]
    #[case::jitter_negative(
        ExponentialBackoff::builder().jitter_factor(-0.1),
        ConfigError::InvalidJitterFactor(-0.1)
    )]
    fn test_builder_rejects(#[case] builder: ExponentialBackoffBuilder, #[case] expected: ConfigError) {
        assert_eq!(builder.build().unwrap_err(), expected);
    }

    /// Replays one raw value for every draw.
    struct FixedRng(u64);

    impl rand::RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            (self.0 >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                chunk.copy_from_slice(&self.0.to_le_bytes()[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_jitter_at_duration_max_saturates() {
        let backoff = ExponentialBackoff::builder()
            .max_delay(Duration::MAX)
            .jitter_factor(0.5)
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let delay = backoff.supply_retry_delay_with(Duration::MAX, &mut rng);
            assert!(delay > Duration::MAX / 4, "delay {:?} too small", delay);
        }

        // Largest possible draw pushes the product past Duration::MAX.
        let delay = backoff.supply_retry_delay_with(Duration::MAX, &mut FixedRng(u64::MAX));
        assert_eq!(delay, Duration::MAX);
        assert!(backoff.supply_retry_delay(Duration::MAX) > Duration::MAX / 4);
    }

    #[rstest]
    // Smallest positive draw: offset rounds onto -jitter.
    #[case::lower_bound(1 << 11)]
    // Largest draw: offset rounds onto +jitter.
    #[case::upper_bound(u64::MAX)]
    fn test_rounded_jitter_stays_inside_open_interval(#[case] raw: u64) {
        let backoff = ExponentialBackoff::builder()
            .min_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(1))
            .jitter_factor(0.5)
            .build()
            .unwrap();

        let delay = backoff.supply_retry_delay_with(Duration::ZERO, &mut FixedRng(raw));
        assert!(
            delay > Duration::from_millis(500) && delay < Duration::from_millis(1500),
            "delay {:?} outside (500ms, 1.5s)",
            delay
        );
    }

    #[test]
    fn test_builder_rejects_nan_factors() {
        assert!(matches!(
            ExponentialBackoff::builder().backoff_factor(f64::NAN).build(),
            Err(ConfigError::InvalidBackoffFactor(_))
        ));
        assert!(matches!(
            ExponentialBackoff::builder().jitter_factor(f64::NAN).build(),
            Err(ConfigError::InvalidJitterFactor(_))
        ));
    }
}
