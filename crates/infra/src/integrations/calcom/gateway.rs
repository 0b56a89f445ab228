//! Cal.com gateway implementing the BookingGateway port.
//!
//! Every call is bounded: a per-attempt HTTP timeout plus a retry ceiling
//! with exponential backoff. Transport failures, 429 and 5xx responses are
//! retried; any other 4xx is treated as permanent.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use slotbook_common::resilience::{
    RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
};
use slotbook_core::{AvailabilityWindow, BookingGateway, BookingRequest, ExternalBooking};
use slotbook_domain::{ExternalSyncConfig, Result, SlotbookError};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::types::{
    AttendeePayload, AvailabilityPayload, BookingMetadata, BookingPayload, BookingResponse,
    DateRange,
};
use crate::errors::InfraError;

/// One failed HTTP exchange, classified for the retry policy.
#[derive(Debug, Error)]
enum CallError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String, retry_after: Option<Duration> },
}

/// Transport failures, 429 and 5xx are transient; other statuses are final.
/// Server-supplied Retry-After hints are honoured only up to `max_delay`, so
/// a hostile or misconfigured hint cannot stall the caller beyond the
/// configured retry ceiling.
struct SyncRetryPolicy {
    max_delay: Duration,
}

impl RetryPolicy<CallError> for SyncRetryPolicy {
    fn should_retry(&self, error: &CallError, _attempt: u32) -> RetryDecision {
        match error {
            CallError::Transport(_) => RetryDecision::Retry,
            CallError::Status { code: 429, retry_after: Some(delay), .. } => {
                RetryDecision::RetryAfter((*delay).min(self.max_delay))
            }
            CallError::Status { code: 429, .. } => RetryDecision::Retry,
            CallError::Status { code, .. } if *code >= 500 => RetryDecision::Retry,
            CallError::Status { .. } => RetryDecision::Stop,
        }
    }
}

/// HTTP client for the Cal.com v1 API.
pub struct CalcomGateway {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
    retry_after_cap: Duration,
}

impl CalcomGateway {
    /// Build a gateway from the sync configuration.
    ///
    /// Fails when no API key is configured; callers should fall back to the
    /// no-op gateway when sync is disabled instead of constructing this one.
    pub fn new(config: &ExternalSyncConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SlotbookError::Config("external sync requires an api key".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| SlotbookError::Config(format!("failed to build HTTP client: {err}")))?;

        let retry = RetryConfig::builder()
            .max_attempts(config.max_attempts.max(1))
            .exponential_backoff(
                Duration::from_secs(config.base_delay_secs),
                2.0,
                Duration::from_secs(config.max_delay_secs),
            )
            .equal_jitter()
            .unlimited_time()
            .build()
            .map_err(SlotbookError::Config)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            retry,
            retry_after_cap: Duration::from_secs(config.max_delay_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run one HTTP exchange through the retry executor, returning the
    /// response body on success.
    async fn run<F>(&self, mut send: F) -> Result<String>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let executor = RetryExecutor::new(
            self.retry.clone(),
            SyncRetryPolicy { max_delay: self.retry_after_cap },
        );

        executor
            .execute(|| {
                let request = send().query(&[("apiKey", self.api_key.as_str())]);
                async move {
                    let response = request.send().await?;
                    let response = check_status(response).await?;
                    response.text().await.map_err(CallError::from)
                }
            })
            .await
            .map_err(map_retry_error)
    }
}

#[async_trait]
impl BookingGateway for CalcomGateway {
    #[instrument(skip(self, request), fields(appointment_id = %request.appointment_id))]
    async fn create_booking(&self, request: &BookingRequest) -> Result<Option<ExternalBooking>> {
        let payload = booking_payload(request);
        let url = self.url("/bookings");

        let body = self.run(|| self.client.post(&url).json(&payload)).await?;

        let response: BookingResponse = serde_json::from_str(&body)
            .map_err(|err| SlotbookError::ExternalSync(format!("malformed booking reply: {err}")))?;

        let external_id = response.external_id().ok_or_else(|| {
            SlotbookError::ExternalSync("booking reply carries no identifier".into())
        })?;

        debug!(%external_id, "booking mirrored to platform");
        Ok(Some(ExternalBooking { external_id }))
    }

    #[instrument(skip(self, request), fields(appointment_id = %request.appointment_id))]
    async fn update_booking(&self, external_id: &str, request: &BookingRequest) -> Result<()> {
        let payload = booking_payload(request);
        let url = self.url(&format!("/bookings/{external_id}"));

        self.run(|| self.client.patch(&url).json(&payload)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_booking(&self, external_id: &str) -> Result<()> {
        let url = self.url(&format!("/bookings/{external_id}"));

        match self.run(|| self.client.delete(&url)).await {
            Ok(_) => Ok(()),
            // Already gone on the platform; the mirror converged anyway.
            Err(SlotbookError::ExternalSync(message)) if message.starts_with("HTTP 404") => {
                warn!(external_id, "booking already absent on platform");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, windows), fields(window_count = windows.len()))]
    async fn publish_availability(&self, windows: &[AvailabilityWindow]) -> Result<()> {
        let payload = AvailabilityPayload {
            date_ranges: windows
                .iter()
                .map(|window| DateRange {
                    start: format_naive(window.start),
                    end: format_naive(window.end),
                })
                .collect(),
            time_zone: "UTC".to_string(),
        };
        let url = self.url("/availability");

        self.run(|| self.client.post(&url).json(&payload)).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, CallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    Err(CallError::Status { code: status.as_u16(), body, retry_after })
}

fn map_retry_error(error: RetryError<CallError>) -> SlotbookError {
    match error {
        RetryError::BudgetExceeded { elapsed } => {
            SlotbookError::Network(format!("external sync gave up after {elapsed:?}"))
        }
        RetryError::AttemptsExhausted { source, .. } | RetryError::NonRetryable { source } => {
            match source {
                CallError::Transport(err) => SlotbookError::from(InfraError::from(err)),
                CallError::Status { code, body, .. } if code == 429 || code >= 500 => {
                    SlotbookError::Network(format!("HTTP {code}: {body}"))
                }
                CallError::Status { code, body, .. } => {
                    SlotbookError::ExternalSync(format!("HTTP {code}: {body}"))
                }
            }
        }
    }
}

fn booking_payload(request: &BookingRequest) -> BookingPayload {
    BookingPayload {
        title: format!("Appointment with {}", request.customer_name),
        start: format_naive(request.start_time),
        end: format_naive(request.end_time),
        attendee: AttendeePayload {
            name: request.customer_name.clone(),
            email: attendee_email(&request.customer_name),
            time_zone: "UTC".to_string(),
        },
        metadata: BookingMetadata { appointment_id: request.appointment_id.to_string() },
    }
}

fn format_naive(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Placeholder attendee address derived from the customer name. The platform
/// requires an email, the domain model has none.
fn attendee_email(customer_name: &str) -> String {
    let local: String = customer_name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@example.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendee_email_collapses_whitespace() {
        assert_eq!(attendee_email("Ada  Lovelace"), "ada.lovelace@example.com");
        assert_eq!(attendee_email("  Grace Hopper "), "grace.hopper@example.com");
    }

    fn policy() -> SyncRetryPolicy {
        SyncRetryPolicy { max_delay: Duration::from_secs(60) }
    }

    #[test]
    fn policy_retries_transport_and_throttling() {
        let policy = policy();

        let throttled =
            CallError::Status { code: 429, body: String::new(), retry_after: None };
        assert_eq!(policy.should_retry(&throttled, 0), RetryDecision::Retry);

        let hinted = CallError::Status {
            code: 429,
            body: String::new(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(
            policy.should_retry(&hinted, 0),
            RetryDecision::RetryAfter(Duration::from_secs(7))
        );

        let server_error =
            CallError::Status { code: 503, body: String::new(), retry_after: None };
        assert_eq!(policy.should_retry(&server_error, 0), RetryDecision::Retry);
    }

    #[test]
    fn retry_after_hints_are_clamped_to_the_delay_cap() {
        let day_long_hint = CallError::Status {
            code: 429,
            body: String::new(),
            retry_after: Some(Duration::from_secs(86_400)),
        };
        assert_eq!(
            policy().should_retry(&day_long_hint, 0),
            RetryDecision::RetryAfter(Duration::from_secs(60))
        );
    }

    #[test]
    fn policy_stops_on_client_errors() {
        let bad_request =
            CallError::Status { code: 400, body: "invalid".into(), retry_after: None };
        assert_eq!(policy().should_retry(&bad_request, 0), RetryDecision::Stop);
    }

    #[test]
    fn gateway_requires_api_key() {
        let config = ExternalSyncConfig { enabled: true, ..ExternalSyncConfig::default() };
        assert!(matches!(CalcomGateway::new(&config), Err(SlotbookError::Config(_))));
    }

    #[test]
    fn naive_timestamps_keep_no_offset() {
        let value = chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(format_naive(value), "2025-06-02T10:30:00");
    }
}
