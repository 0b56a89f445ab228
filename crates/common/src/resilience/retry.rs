//! Generic retry execution with configurable backoff and jitter.
//!
//! The executor owns no policy of its own: callers supply a [`RetryPolicy`]
//! that classifies each error as retryable or terminal, and a [`RetryConfig`]
//! that bounds attempts, delays, and total time spent.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors produced by the retry executor.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All attempts failed with retryable errors; carries the last one.
    #[error("all {attempts} retry attempts exhausted")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The operation failed with an error the policy refuses to retry.
    #[error("operation failed with non-retryable error: {source}")]
    NonRetryable { source: E },

    /// The configured total-time budget ran out before an attempt succeeded.
    #[error("retry time budget exceeded after {elapsed:?}")]
    BudgetExceeded { elapsed: Duration },
}

impl<E> RetryError<E> {
    /// The underlying operation error, when one is attached.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::AttemptsExhausted { source, .. } | RetryError::NonRetryable { source } => {
                Some(source)
            }
            RetryError::BudgetExceeded { .. } => None,
        }
    }
}

/// Result type for retry operations.
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Classifies whether a given error is worth another attempt.
pub trait RetryPolicy<E> {
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for a single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the configured backoff delay.
    Retry,
    /// Retry after a caller-supplied delay (e.g. a Retry-After header).
    RetryAfter(Duration),
    /// Give up immediately.
    Stop,
}

/// Backoff strategy for calculating inter-attempt delays.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Fixed(Duration),
    /// Linear backoff: `initial_delay + attempt * increment`.
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: `initial_delay * base^attempt`, capped.
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Delay before the attempt following failed attempt `attempt` (0-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Linear { initial_delay, increment } => {
                *initial_delay + increment.saturating_mul(attempt)
            }
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter applied on top of the calculated backoff delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jitter {
    /// Use the calculated delay as-is.
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay/2, delay]`.
    Equal,
}

impl Jitter {
    /// Apply jitter to a calculated delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_below(delay.as_millis() as u64)),
            Jitter::Equal => {
                let half = delay.as_millis() as u64 / 2;
                Duration::from_millis(half + random_below(half))
            }
        }
    }
}

/// Timing-seeded LCG, good enough for jitter without an RNG dependency.
fn random_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = Instant::now().elapsed().subsec_nanos() as u64;
    let seed = nanos
        .wrapping_mul(1664525)
        .wrapping_add(1013904223)
        .wrapping_mul(1664525)
        .wrapping_add(1013904223);
    seed % max
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays.
    pub backoff: BackoffStrategy,
    /// Jitter applied to each delay.
    pub jitter: Jitter,
    /// Optional cap on total time across all attempts and delays.
    pub max_total_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
            max_total_time: Some(Duration::from_secs(300)),
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Reject configurations that can never make an attempt.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".into());
        }
        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base <= 0.0 {
                return Err("exponential base must be greater than 0".into());
            }
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`] with a fluent API.
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn equal_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Equal;
        self
    }

    pub fn max_total_time(mut self, duration: Duration) -> Self {
        self.config.max_total_time = Some(duration);
        self
    }

    pub fn unlimited_time(mut self) -> Self {
        self.config.max_total_time = None;
        self
    }

    pub fn build(self) -> Result<RetryConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Drives an async operation through attempts according to config + policy.
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Execute `operation`, retrying per policy until success, exhaustion,
    /// a terminal error, or the time budget running out.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            if let Some(budget) = self.config.max_total_time {
                let elapsed = started.elapsed();
                if elapsed >= budget {
                    warn!(?elapsed, attempt, "retry time budget exceeded");
                    return Err(RetryError::BudgetExceeded { elapsed });
                }
            }

            debug!(attempt = attempt + 1, max = self.config.max_attempts, "executing operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    // Classify first: a terminal error on the final attempt
                    // is still terminal, not exhaustion.
                    let delay = match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!(?error, "error classified as non-retryable");
                            return Err(RetryError::NonRetryable { source: error });
                        }
                        RetryDecision::Retry => {
                            self.config.jitter.apply(self.config.backoff.calculate_delay(attempt))
                        }
                        RetryDecision::RetryAfter(custom) => custom,
                    };

                    if attempt >= self.config.max_attempts.saturating_sub(1) {
                        warn!(attempts = attempt + 1, ?error, "all retry attempts exhausted");
                        return Err(RetryError::AttemptsExhausted {
                            attempts: attempt + 1,
                            source: error,
                        });
                    }

                    warn!(attempt = attempt + 1, ?delay, ?error, "attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
