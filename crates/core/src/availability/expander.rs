//! Availability expander
//!
//! Projects a set of weekly recurring rules onto concrete dates, producing
//! sorted [`TimeSlot`]s for an inclusive date range. Purely a projection:
//! no side effects, safe to call repeatedly and concurrently.

use chrono::NaiveDate;
use slotbook_domain::{AvailabilityRule, TimeSlot};

/// Expand weekly `rules` into dated time slots over `[start_date, end_date]`
/// (inclusive).
///
/// Returns slots sorted ascending by start time; the sort is stable so
/// same-day rules keep their input order. An inverted range or an empty rule
/// set yields an empty vector rather than an error.
pub fn expand(rules: &[AvailabilityRule], start_date: NaiveDate, end_date: NaiveDate) -> Vec<TimeSlot> {
    if rules.is_empty() || start_date > end_date {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut current = start_date;

    loop {
        for rule in rules.iter().filter(|rule| rule.applies_on(current)) {
            slots.push(TimeSlot {
                start_time: current.and_time(rule.start_time),
                end_time: current.and_time(rule.end_time),
                available: true,
            });
        }

        if current == end_date {
            break;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    slots.sort_by_key(|slot| slot.start_time);
    slots
}
