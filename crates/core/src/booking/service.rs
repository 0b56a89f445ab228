//! Appointment lifecycle service - core business logic
//!
//! Orchestrates create/update/delete over the validator and the storage
//! port, serializing same-user operations on a per-user lock so only one of
//! a set of overlapping requests can commit. The external platform mirror
//! is advisory: it runs after the local write, outside the lock, and its
//! failures are logged and swallowed.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use slotbook_common::testing::Clock;
use slotbook_domain::constants::{
    MAX_APPOINTMENT_DURATION_MINUTES, MAX_CUSTOMER_NAME_LENGTH, MIN_APPOINTMENT_DURATION_MINUTES,
};
use slotbook_domain::{
    Appointment, AppointmentId, AppointmentPatch, NewAppointment, Result, SlotbookError, UserId,
};
use tracing::{info, warn};

use super::locks::UserLocks;
use super::ports::AppointmentRepository;
use super::validator::SlotValidator;
use crate::availability::ports::AvailabilityRepository;
use crate::platform_ports::{BookingGateway, BookingRequest};

/// Appointment lifecycle service
pub struct AppointmentService {
    repository: Arc<dyn AppointmentRepository>,
    validator: SlotValidator,
    gateway: Arc<dyn BookingGateway>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl AppointmentService {
    /// Create a new appointment service
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        availability: Arc<dyn AvailabilityRepository>,
        gateway: Arc<dyn BookingGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = SlotValidator::new(availability, Arc::clone(&repository));
        Self { repository, validator, gateway, clock, locks: UserLocks::new() }
    }

    /// Book a new appointment.
    ///
    /// Field validation and the availability check run under the user's
    /// lock; nothing is persisted when either fails. The platform mirror
    /// runs after the local insert and stores the external id when it
    /// succeeds.
    pub async fn create(&self, user_id: UserId, new: NewAppointment) -> Result<Appointment> {
        let customer_name = validate_customer_name(&new.customer_name)?;
        validate_duration(new.duration_minutes)?;
        let now = self.clock.now();
        validate_start_time(new.start_time, now)?;

        let appointment = {
            let _guard = self.locks.acquire(user_id).await;

            if !self
                .validator
                .is_available(user_id, new.start_time, new.duration_minutes, None)
                .await?
            {
                return Err(SlotbookError::SlotUnavailable(
                    "selected time slot is not available".into(),
                ));
            }

            let appointment = Appointment {
                id: AppointmentId::new(),
                user_id,
                customer_name,
                start_time: new.start_time,
                duration_minutes: new.duration_minutes,
                external_booking_id: None,
                created_at: now,
                updated_at: now,
            };
            self.repository.insert(&appointment).await.map_err(conflict_as_unavailable)?;
            appointment
        };

        info!(%user_id, appointment_id = %appointment.id, "created appointment");

        // The local create is committed; recording the external id is
        // bookkeeping and must not turn success into an error.
        match self.mirror_create(&appointment).await {
            Some(external_id) => match self
                .repository
                .set_external_booking_id(user_id, appointment.id, &external_id)
                .await
            {
                Ok(()) => Ok(Appointment { external_booking_id: Some(external_id), ..appointment }),
                Err(error) => {
                    warn!(
                        appointment_id = %appointment.id, %external_id, %error,
                        "failed to record external booking id, keeping local appointment"
                    );
                    Ok(appointment)
                }
            },
            None => Ok(appointment),
        }
    }

    /// Fetch one appointment. Absent and foreign-owned are both NotFound.
    pub async fn get(&self, user_id: UserId, id: AppointmentId) -> Result<Appointment> {
        self.repository.find(user_id, id).await?.ok_or_else(|| not_found(id))
    }

    /// Appointments whose start falls within the optional inclusive date
    /// range, ascending by start time.
    pub async fn list(
        &self,
        user_id: UserId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        let from = start_date.map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default());
        // Inclusive end date: extend to the last representable instant of day
        let to = end_date
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999));
        self.repository.list(user_id, from, to).await
    }

    /// Appointments starting strictly after now, ascending.
    pub async fn list_upcoming(&self, user_id: UserId) -> Result<Vec<Appointment>> {
        self.repository.list_after(user_id, self.clock.now()).await
    }

    /// Reschedule and/or rename an appointment.
    ///
    /// Unspecified fields keep their stored values. When time or duration
    /// change, the slot is revalidated with the appointment excluded so it
    /// cannot conflict with itself; a rejection leaves the stored record
    /// untouched.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AppointmentId,
        patch: AppointmentPatch,
    ) -> Result<Appointment> {
        let customer_name = match &patch.customer_name {
            Some(name) => Some(validate_customer_name(name)?),
            None => None,
        };
        if let Some(duration) = patch.duration_minutes {
            validate_duration(duration)?;
        }
        let now = self.clock.now();
        if let Some(start) = patch.start_time {
            validate_start_time(start, now)?;
        }

        let (updated, reschedule) = {
            let _guard = self.locks.acquire(user_id).await;

            let existing = self.repository.find(user_id, id).await?.ok_or_else(|| not_found(id))?;

            let mut updated = existing.clone();
            if let Some(name) = customer_name {
                updated.customer_name = name;
            }
            if let Some(start) = patch.start_time {
                updated.start_time = start;
            }
            if let Some(duration) = patch.duration_minutes {
                updated.duration_minutes = duration;
            }

            let reschedule = patch.reschedules();
            if reschedule
                && !self
                    .validator
                    .is_available(user_id, updated.start_time, updated.duration_minutes, Some(id))
                    .await?
            {
                return Err(SlotbookError::SlotUnavailable(
                    "updated time slot is not available".into(),
                ));
            }

            updated.updated_at = now;
            self.repository.update(&updated).await.map_err(conflict_as_unavailable)?;
            (updated, reschedule)
        };

        info!(%user_id, appointment_id = %id, reschedule, "updated appointment");

        if reschedule {
            if let Some(external_id) = updated.external_booking_id.clone() {
                self.mirror_update(&external_id, &updated).await;
            }
        }

        Ok(updated)
    }

    /// Delete an appointment.
    ///
    /// The platform mirror is attempted first but never blocks deletion:
    /// the local record is removed regardless of the mirror outcome.
    pub async fn delete(&self, user_id: UserId, id: AppointmentId) -> Result<()> {
        let existing = self.repository.find(user_id, id).await?.ok_or_else(|| not_found(id))?;

        if let Some(external_id) = existing.external_booking_id.as_deref() {
            if let Err(error) = self.gateway.delete_booking(external_id).await {
                warn!(%external_id, %error, "external booking delete failed, removing local record anyway");
            }
        }

        let removed = self.repository.delete(user_id, id).await?;
        if !removed {
            return Err(not_found(id));
        }
        info!(%user_id, appointment_id = %id, "deleted appointment");
        Ok(())
    }

    /// Best-effort mirror of a new appointment; returns the external id on
    /// success, `None` on any failure or when sync is disabled.
    async fn mirror_create(&self, appointment: &Appointment) -> Option<String> {
        match self.gateway.create_booking(&booking_request(appointment)).await {
            Ok(Some(booking)) => {
                info!(appointment_id = %appointment.id, external_id = %booking.external_id, "mirrored appointment to platform");
                Some(booking.external_id)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(appointment_id = %appointment.id, %error, "external booking create failed, keeping local appointment");
                None
            }
        }
    }

    /// Best-effort mirror of a reschedule.
    async fn mirror_update(&self, external_id: &str, appointment: &Appointment) {
        if let Err(error) =
            self.gateway.update_booking(external_id, &booking_request(appointment)).await
        {
            warn!(%external_id, %error, "external booking update failed, keeping local change");
        }
    }
}

fn booking_request(appointment: &Appointment) -> BookingRequest {
    BookingRequest {
        appointment_id: appointment.id,
        customer_name: appointment.customer_name.clone(),
        start_time: appointment.start_time,
        end_time: appointment.end_time(),
    }
}

fn not_found(id: AppointmentId) -> SlotbookError {
    SlotbookError::NotFound(format!("appointment {id} not found"))
}

/// A storage-level write conflict at commit means a concurrent writer won
/// the slot; callers see that as the slot being unavailable.
fn conflict_as_unavailable(error: SlotbookError) -> SlotbookError {
    match error {
        SlotbookError::ConcurrencyConflict(_) => {
            SlotbookError::SlotUnavailable("slot was taken by a concurrent request".into())
        }
        other => other,
    }
}

fn validate_customer_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SlotbookError::InvalidInput("customer name cannot be empty".into()));
    }
    if trimmed.len() > MAX_CUSTOMER_NAME_LENGTH {
        return Err(SlotbookError::InvalidInput(format!(
            "customer name exceeds {MAX_CUSTOMER_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_duration(duration_minutes: i64) -> Result<()> {
    if duration_minutes < MIN_APPOINTMENT_DURATION_MINUTES {
        return Err(SlotbookError::InvalidInput("duration must be positive".into()));
    }
    if duration_minutes > MAX_APPOINTMENT_DURATION_MINUTES {
        return Err(SlotbookError::InvalidInput("duration cannot exceed 8 hours".into()));
    }
    Ok(())
}

fn validate_start_time(start: NaiveDateTime, now: NaiveDateTime) -> Result<()> {
    if start <= now {
        return Err(SlotbookError::InvalidInput(
            "appointment cannot be scheduled in the past".into(),
        ));
    }
    // Guard against nonsense far-future dates overflowing interval math
    if start > now + Duration::days(365 * 100) {
        return Err(SlotbookError::InvalidInput("start time is unreasonably far ahead".into()));
    }
    Ok(())
}
