//! # Slotbook Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repository implementations (rusqlite behind an r2d2 pool)
//! - The Cal.com booking-platform gateway (reqwest with bounded retries)
//! - Configuration loading (environment, then probed config files)
//! - Tracing initialisation
//!
//! ## Architecture
//! - Implements traits defined in `slotbook-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use database::{DbManager, SqliteAppointmentRepository, SqliteAvailabilityRepository};
pub use errors::InfraError;
pub use integrations::calcom::CalcomGateway;
