//! Foundational utilities shared across slotbook crates.
//!
//! This crate knows nothing about the booking domain. It provides:
//! - `resilience`: generic retry with configurable backoff and jitter
//! - `testing`: a clock abstraction for deterministic time in tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod resilience;
pub mod testing;

pub use resilience::{
    BackoffStrategy, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
    RetryResult,
};
pub use testing::{Clock, MockClock, SystemClock};
