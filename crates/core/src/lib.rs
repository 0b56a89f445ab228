//! # Slotbook Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The availability expander and availability service
//! - The booking conflict validator and appointment lifecycle service
//! - Port/adapter interfaces (traits) for storage and the external platform
//!
//! ## Architecture Principles
//! - Only depends on `slotbook-common` and `slotbook-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod availability;
pub mod booking;
pub mod platform_ports;

// Re-export specific items to avoid ambiguity
pub use availability::expander::expand;
pub use availability::ports::AvailabilityRepository;
pub use availability::AvailabilityService;
pub use booking::ports::AppointmentRepository;
pub use booking::validator::SlotValidator;
pub use booking::AppointmentService;
pub use platform_ports::{
    AvailabilityWindow, BookingGateway, BookingRequest, ExternalBooking, NoopBookingGateway,
};
