//! Port interfaces for appointment storage
//!
//! Every query is scoped by user id; a lookup for an appointment owned by a
//! different user behaves exactly like a lookup for a missing one.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use slotbook_domain::{Appointment, AppointmentId, Result, UserId};

/// Trait for persisting appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Insert a new appointment.
    async fn insert(&self, appointment: &Appointment) -> Result<()>;

    /// Persist updated fields of an existing appointment.
    async fn update(&self, appointment: &Appointment) -> Result<()>;

    /// Remove an appointment scoped to its owner. Returns whether a row
    /// existed.
    async fn delete(&self, user_id: UserId, id: AppointmentId) -> Result<bool>;

    /// Fetch one appointment scoped to its owner.
    async fn find(&self, user_id: UserId, id: AppointmentId) -> Result<Option<Appointment>>;

    /// All appointments for a user with `start_time` inside the optional
    /// inclusive bounds, ascending by start time.
    async fn list(
        &self,
        user_id: UserId,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<Appointment>>;

    /// Appointments starting strictly after `after`, ascending.
    async fn list_after(&self, user_id: UserId, after: NaiveDateTime) -> Result<Vec<Appointment>>;

    /// Record the external platform's booking id once sync succeeds.
    /// Does not touch `updated_at`; the appointment itself is unchanged.
    async fn set_external_booking_id(
        &self,
        user_id: UserId,
        id: AppointmentId,
        external_id: &str,
    ) -> Result<()>;
}
