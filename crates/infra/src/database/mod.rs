//! SQLite persistence layer.

mod appointment_repository;
mod availability_repository;
mod manager;

pub use appointment_repository::SqliteAppointmentRepository;
pub use availability_repository::SqliteAvailabilityRepository;
pub use manager::{DbConnection, DbManager};
