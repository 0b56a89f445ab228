//! Wire types for the Cal.com v1 API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Booking creation / update payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub title: String,
    /// Naive ISO-8601, e.g. `2025-06-02T10:00:00`.
    pub start: String,
    pub end: String,
    pub attendee: AttendeePayload,
    pub metadata: BookingMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeePayload {
    pub name: String,
    pub email: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingMetadata {
    pub appointment_id: String,
}

/// Subset of the booking object Cal.com returns. Older API versions expose a
/// numeric `id` only, newer ones also carry a string `uid`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingResponse {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl BookingResponse {
    /// Stable external identifier for the booking, preferring `uid`.
    pub fn external_id(&self) -> Option<String> {
        if let Some(uid) = &self.uid {
            return Some(uid.clone());
        }
        match &self.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Availability publication payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub date_ranges: Vec<DateRange>,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: String,
    pub end: String,
}
