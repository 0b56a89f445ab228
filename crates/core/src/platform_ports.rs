//! External booking-platform port interfaces
//!
//! The platform mirror is advisory: local storage is the source of truth and
//! gateway failures never roll back or fail a local operation. Adapters are
//! expected to bound every call (per-attempt timeout times retry ceiling).

use async_trait::async_trait;
use chrono::NaiveDateTime;
use slotbook_domain::{AppointmentId, Result};

/// Booking payload pushed to the external platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub appointment_id: AppointmentId,
    pub customer_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Acknowledgement returned by the platform for a created booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalBooking {
    pub external_id: String,
}

/// A concrete availability window published to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Trait for external booking-platform operations.
///
/// `create_booking` returns `Ok(None)` when the adapter has nothing to
/// record (sync disabled); the lifecycle service then leaves the local
/// appointment without an external id.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Mirror a new appointment to the platform.
    async fn create_booking(&self, request: &BookingRequest) -> Result<Option<ExternalBooking>>;

    /// Update a previously mirrored booking.
    async fn update_booking(&self, external_id: &str, request: &BookingRequest) -> Result<()>;

    /// Remove a previously mirrored booking.
    async fn delete_booking(&self, external_id: &str) -> Result<()>;

    /// Publish upcoming availability windows.
    async fn publish_availability(&self, windows: &[AvailabilityWindow]) -> Result<()>;
}

/// Gateway that mirrors nothing. Used when external sync is disabled and as
/// a default in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBookingGateway;

#[async_trait]
impl BookingGateway for NoopBookingGateway {
    async fn create_booking(&self, _request: &BookingRequest) -> Result<Option<ExternalBooking>> {
        Ok(None)
    }

    async fn update_booking(&self, _external_id: &str, _request: &BookingRequest) -> Result<()> {
        Ok(())
    }

    async fn delete_booking(&self, _external_id: &str) -> Result<()> {
        Ok(())
    }

    async fn publish_availability(&self, _windows: &[AvailabilityWindow]) -> Result<()> {
        Ok(())
    }
}
