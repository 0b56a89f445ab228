//! Resilience primitives for calls that may fail transiently.

pub mod retry;

pub use retry::{
    BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
