//! Weekly availability: expansion and management.

pub mod expander;
pub mod ports;
pub mod service;

pub use service::AvailabilityService;
