//! Backoff strategies for retries and reconnects
//!
//! [`BackoffStrategy`] computes the delay for a given attempt and
//! [`Backoff`] tracks the attempt counter for a loop that keeps reconnecting
//! (the device-status stream) or retrying (the HTTP client).

use std::time::Duration;

use rand::Rng;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Exponential doubling starting at `initial_delay`, capped at `max_delay`.
    pub fn doubling(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::Exponential { initial_delay, base: 2.0, max_delay }
    }

    /// Fixed delay when `max_delay <= initial_delay`, doubling otherwise.
    pub fn reconnect(initial_delay: Duration, max_delay: Duration) -> Self {
        if max_delay <= initial_delay {
            Self::Fixed(initial_delay)
        } else {
            Self::doubling(initial_delay, max_delay)
        }
    }

    /// Calculate the delay for the given zero-based attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_millis() as f64 * base.powi(exponent);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// No jitter
    #[default]
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_up_to(millis)),
            Jitter::Equal => {
                let half = millis / 2;
                Duration::from_millis(half + random_up_to(millis - half))
            }
        }
    }
}

fn random_up_to(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=max)
}

/// Attempt counter over a [`BackoffStrategy`].
///
/// `next_delay` returns the delay for the current attempt and advances;
/// `reset` starts over after a successful connection.
#[derive(Debug, Clone)]
pub struct Backoff {
    strategy: BackoffStrategy,
    jitter: Jitter,
    attempt: u32,
}

impl Backoff {
    pub fn new(strategy: BackoffStrategy) -> Self {
        Self { strategy, jitter: Jitter::None, attempt: 0 }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.jitter.apply(self.strategy.calculate_delay(self.attempt));
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }
}
