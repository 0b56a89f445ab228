//! Weekly availability template types
//!
//! An [`AvailabilityRule`] is a recurring weekly window (day-of-week plus
//! time-of-day range) during which the user may be booked. Rules carry no
//! date; the expander projects them onto concrete dates as [`TimeSlot`]s.
//! Day-of-week numbering is 0 = Monday through 6 = Sunday.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_DAY_OF_WEEK;
use crate::errors::{Result, SlotbookError};
use crate::types::ids::{RuleId, UserId};

/// A recurring weekly availability window owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: RuleId,
    pub user_id: UserId,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: NaiveDateTime,
}

impl AvailabilityRule {
    /// Whether this rule applies on the given calendar date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.day_of_week == day_of_week(date)
    }
}

/// Incoming availability window used for wholesale replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityUpdate {
    /// Validate the window: day in range, start strictly before end.
    pub fn validate(&self) -> Result<()> {
        if self.day_of_week > MAX_DAY_OF_WEEK {
            return Err(SlotbookError::InvalidInput(format!(
                "invalid day_of_week: {}",
                self.day_of_week
            )));
        }
        if self.start_time >= self.end_time {
            return Err(SlotbookError::InvalidInput(format!(
                "start time must be before end time: {} >= {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

/// A concrete, dated projection of an availability rule. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub available: bool,
}

impl TimeSlot {
    /// Whether `[start, end)` lies entirely within this slot.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time <= start && self.end_time >= end
    }
}

/// Day-of-week for a date with Monday as 0, matching the rule encoding.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}
