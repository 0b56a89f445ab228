//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Appointment constraints
pub const MIN_APPOINTMENT_DURATION_MINUTES: i64 = 1;
pub const MAX_APPOINTMENT_DURATION_MINUTES: i64 = 480; // 8 hours
pub const MAX_CUSTOMER_NAME_LENGTH: usize = 255;

// Availability constraints (0 = Monday, 6 = Sunday)
pub const MIN_DAY_OF_WEEK: u8 = 0;
pub const MAX_DAY_OF_WEEK: u8 = 6;

// External sync retry configuration
pub const SYNC_MAX_ATTEMPTS: u32 = 4; // initial call + 3 retries
pub const SYNC_BASE_DELAY_SECS: u64 = 1;
pub const SYNC_MAX_DELAY_SECS: u64 = 60;
pub const SYNC_REQUEST_TIMEOUT_SECS: u64 = 30;

// How far ahead availability windows are published to the external platform
pub const SYNC_PUBLISH_HORIZON_DAYS: i64 = 7;
