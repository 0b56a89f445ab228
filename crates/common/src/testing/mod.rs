//! Test support utilities usable from production code paths.

pub mod time;

pub use time::{Clock, MockClock, SystemClock};
