//! Appointment types
//!
//! Appointments occupy half-open `[start_time, end_time)` intervals; two
//! appointments for the same user must never overlap. `end_time` is derived
//! from start and duration, never stored independently.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::ids::{AppointmentId, UserId};

/// A booked appointment owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub user_id: UserId,
    pub customer_name: String,
    pub start_time: NaiveDateTime,
    pub duration_minutes: i64,
    /// Set once the external platform has acknowledged this booking.
    pub external_booking_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    /// Derived end of the appointment interval.
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(self.duration_minutes)
    }

    /// Half-open interval overlap with `[other_start, other_start + dur)`.
    /// Touching endpoints do not overlap.
    pub fn overlaps_with(&self, other_start: NaiveDateTime, other_duration_minutes: i64) -> bool {
        let other_end = other_start + Duration::minutes(other_duration_minutes);
        self.start_time < other_end && self.end_time() > other_start
    }
}

/// Fields required to create an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub customer_name: String,
    pub start_time: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Partial update; `None` fields retain the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub customer_name: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
}

impl AppointmentPatch {
    /// Whether the patch moves the appointment in time.
    pub fn reschedules(&self) -> bool {
        self.start_time.is_some() || self.duration_minutes.is_some()
    }

    /// Whether the patch changes nothing at all.
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none() && !self.reschedules()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn appointment(start_h: u32, start_m: u32, duration: i64) -> Appointment {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let start = date.and_hms_opt(start_h, start_m, 0).unwrap();
        Appointment {
            id: AppointmentId::new(),
            user_id: UserId::new(),
            customer_name: "Ada".into(),
            start_time: start,
            duration_minutes: duration,
            external_booking_id: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn end_time_is_start_plus_duration() {
        let appt = appointment(10, 0, 60);
        assert_eq!(appt.end_time(), at(11, 0));
    }

    #[test]
    fn overlapping_intervals_are_detected() {
        let appt = appointment(10, 0, 60);
        assert!(appt.overlaps_with(at(10, 30), 30));
        assert!(appt.overlaps_with(at(9, 30), 60));
        assert!(appt.overlaps_with(at(10, 0), 60));
        assert!(appt.overlaps_with(at(9, 0), 180));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let appt = appointment(10, 0, 60);
        assert!(!appt.overlaps_with(at(11, 0), 30));
        assert!(!appt.overlaps_with(at(9, 0), 60));
    }

    #[test]
    fn patch_reschedule_detection() {
        assert!(!AppointmentPatch::default().reschedules());
        assert!(AppointmentPatch::default().is_empty());

        let patch = AppointmentPatch { duration_minutes: Some(30), ..Default::default() };
        assert!(patch.reschedules());

        let rename = AppointmentPatch { customer_name: Some("Grace".into()), ..Default::default() };
        assert!(!rename.reschedules());
        assert!(!rename.is_empty());
    }
}
