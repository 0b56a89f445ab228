//! Conflict validator
//!
//! Decides whether a candidate `(start, duration)` can be admitted for a
//! user: the candidate must lie entirely within one of the day's
//! availability windows and must not overlap any existing appointment.
//! Pure check - no side effects, safe to call speculatively. Atomicity
//! against concurrent writers is the lifecycle service's job (per-user
//! lock), not this one's.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use slotbook_domain::types::availability::day_of_week;
use slotbook_domain::{AppointmentId, Result, UserId};
use tracing::debug;

use super::ports::AppointmentRepository;
use crate::availability::expander::expand;
use crate::availability::ports::AvailabilityRepository;

/// Validates candidate slots against availability and existing bookings.
pub struct SlotValidator {
    availability: Arc<dyn AvailabilityRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl SlotValidator {
    /// Create a new validator over the given storage ports.
    pub fn new(
        availability: Arc<dyn AvailabilityRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { availability, appointments }
    }

    /// Whether `[start, start + duration)` is bookable for the user.
    ///
    /// Checks short-circuit in order: a rule must exist for the candidate's
    /// weekday, one same-day window must fully contain the candidate
    /// (partial overlap is not enough), and no existing appointment other
    /// than `exclude` may overlap it. Touching endpoints do not conflict.
    pub async fn is_available(
        &self,
        user_id: UserId,
        start: NaiveDateTime,
        duration_minutes: i64,
        exclude: Option<AppointmentId>,
    ) -> Result<bool> {
        let date = start.date();
        let end = start + Duration::minutes(duration_minutes);

        let rules = self.availability.rules_for_day(user_id, day_of_week(date)).await?;
        if rules.is_empty() {
            debug!(%user_id, %date, "no availability rules for weekday");
            return Ok(false);
        }

        let contained =
            expand(&rules, date, date).iter().any(|slot| slot.contains(start, end));
        if !contained {
            debug!(%user_id, %start, %end, "candidate outside available hours");
            return Ok(false);
        }

        let existing = self.appointments.list(user_id, None, None).await?;
        for appointment in
            existing.iter().filter(|a| exclude.map_or(true, |id| a.id != id))
        {
            if appointment.overlaps_with(start, duration_minutes) {
                debug!(%user_id, conflicting = %appointment.id, "candidate overlaps existing appointment");
                return Ok(false);
            }
        }

        Ok(true)
    }
}
