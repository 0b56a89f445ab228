//! Domain types and models

pub mod appointment;
pub mod availability;
pub mod ids;

pub use appointment::{Appointment, AppointmentPatch, NewAppointment};
pub use availability::{AvailabilityRule, AvailabilityUpdate, TimeSlot};
pub use ids::{AppointmentId, RuleId, UserId};
