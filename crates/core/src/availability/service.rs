//! Availability service - weekly template management
//!
//! Owns the read/replace lifecycle of a user's weekly availability template
//! and the advisory push of upcoming windows to the external platform.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use slotbook_common::testing::Clock;
use slotbook_domain::constants::SYNC_PUBLISH_HORIZON_DAYS;
use slotbook_domain::{AvailabilityRule, AvailabilityUpdate, Result, TimeSlot, UserId};
use slotbook_domain::types::availability::day_of_week;
use tracing::{debug, info, warn};

use super::expander::expand;
use super::ports::AvailabilityRepository;
use crate::platform_ports::{AvailabilityWindow, BookingGateway};

/// Availability management service
pub struct AvailabilityService {
    repository: Arc<dyn AvailabilityRepository>,
    gateway: Arc<dyn BookingGateway>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    /// Create a new availability service
    pub fn new(
        repository: Arc<dyn AvailabilityRepository>,
        gateway: Arc<dyn BookingGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, gateway, clock }
    }

    /// Expand the user's weekly template into concrete slots over the
    /// inclusive date range. A user without rules gets an empty list.
    pub async fn get_availability(
        &self,
        user_id: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let rules = self.repository.rules_for_user(user_id).await?;
        let slots = expand(&rules, start_date, end_date);
        debug!(%user_id, count = slots.len(), "expanded availability slots");
        Ok(slots)
    }

    /// Slots for a single calendar day.
    pub async fn get_availability_for_day(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        self.get_availability(user_id, date, date).await
    }

    /// Whether the user has any rule matching the date's weekday.
    pub async fn has_availability_on_day(&self, user_id: UserId, date: NaiveDate) -> Result<bool> {
        let rules = self.repository.rules_for_day(user_id, day_of_week(date)).await?;
        Ok(!rules.is_empty())
    }

    /// Replace the user's full weekly template. Every window is validated
    /// before anything is written; the swap itself is transactional.
    pub async fn replace_availability(
        &self,
        user_id: UserId,
        windows: Vec<AvailabilityUpdate>,
    ) -> Result<Vec<AvailabilityRule>> {
        for window in &windows {
            window.validate()?;
        }

        let rules = self.repository.replace_all(user_id, &windows).await?;
        info!(%user_id, count = rules.len(), "replaced availability rules");
        Ok(rules)
    }

    /// Push the next week's worth of expanded windows to the external
    /// platform. Local rules are the source of truth; this mirrors them.
    pub async fn sync_to_platform(&self, user_id: UserId) -> Result<()> {
        let rules = self.repository.rules_for_user(user_id).await?;
        if rules.is_empty() {
            warn!(%user_id, "no availability rules to sync");
            return Ok(());
        }

        let today = self.clock.now().date();
        let mut windows = Vec::with_capacity(rules.len());
        for rule in &rules {
            let target = next_occurrence(today, rule.day_of_week);
            windows.push(AvailabilityWindow {
                start: target.and_time(rule.start_time),
                end: target.and_time(rule.end_time),
            });
        }

        self.gateway.publish_availability(&windows).await?;
        info!(%user_id, windows = windows.len(), "published availability to platform");
        Ok(())
    }
}

/// Next strictly-future date whose weekday matches `target_dow` (a window
/// for today's weekday is scheduled a full week out).
fn next_occurrence(today: NaiveDate, target_dow: u8) -> NaiveDate {
    let mut days_ahead = i64::from(target_dow) - i64::from(day_of_week(today));
    if days_ahead <= 0 {
        days_ahead += SYNC_PUBLISH_HORIZON_DAYS;
    }
    today + Duration::days(days_ahead)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{NaiveDateTime, NaiveTime};
    use parking_lot::Mutex;
    use slotbook_common::testing::MockClock;
    use slotbook_domain::{RuleId, SlotbookError};

    use super::*;
    use crate::platform_ports::{BookingRequest, ExternalBooking};

    #[derive(Default)]
    struct FakeAvailabilityRepo {
        rules: Mutex<Vec<AvailabilityRule>>,
    }

    #[async_trait]
    impl AvailabilityRepository for FakeAvailabilityRepo {
        async fn rules_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityRule>> {
            Ok(self.rules.lock().iter().filter(|r| r.user_id == user_id).cloned().collect())
        }

        async fn rules_for_day(
            &self,
            user_id: UserId,
            day: u8,
        ) -> Result<Vec<AvailabilityRule>> {
            Ok(self
                .rules
                .lock()
                .iter()
                .filter(|r| r.user_id == user_id && r.day_of_week == day)
                .cloned()
                .collect())
        }

        async fn replace_all(
            &self,
            user_id: UserId,
            windows: &[AvailabilityUpdate],
        ) -> Result<Vec<AvailabilityRule>> {
            let mut rules = self.rules.lock();
            rules.retain(|r| r.user_id != user_id);
            let now = NaiveDateTime::default();
            let new_rules: Vec<_> = windows
                .iter()
                .map(|w| AvailabilityRule {
                    id: RuleId::new(),
                    user_id,
                    day_of_week: w.day_of_week,
                    start_time: w.start_time,
                    end_time: w.end_time,
                    created_at: now,
                })
                .collect();
            rules.extend(new_rules.clone());
            Ok(new_rules)
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        published: Mutex<Vec<Vec<AvailabilityWindow>>>,
    }

    #[async_trait]
    impl BookingGateway for RecordingGateway {
        async fn create_booking(
            &self,
            _request: &BookingRequest,
        ) -> Result<Option<ExternalBooking>> {
            Ok(None)
        }

        async fn update_booking(&self, _id: &str, _request: &BookingRequest) -> Result<()> {
            Ok(())
        }

        async fn delete_booking(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn publish_availability(&self, windows: &[AvailabilityWindow]) -> Result<()> {
            self.published.lock().push(windows.to_vec());
            Ok(())
        }
    }

    fn window(day: u8, start: (u32, u32), end: (u32, u32)) -> AvailabilityUpdate {
        AvailabilityUpdate {
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    fn service_with(
        gateway: Arc<RecordingGateway>,
    ) -> (AvailabilityService, Arc<FakeAvailabilityRepo>) {
        let repo = Arc::new(FakeAvailabilityRepo::default());
        // Wednesday 2025-06-04 10:00
        let clock = MockClock::at(
            NaiveDate::from_ymd_opt(2025, 6, 4).unwrap().and_hms_opt(10, 0, 0).unwrap(),
        );
        let service = AvailabilityService::new(repo.clone(), gateway, Arc::new(clock));
        (service, repo)
    }

    #[tokio::test]
    async fn replace_swaps_entire_rule_set() {
        let (service, _repo) = service_with(Arc::new(RecordingGateway::default()));
        let user = UserId::new();

        let first = service
            .replace_availability(user, vec![window(0, (9, 0), (17, 0)), window(1, (9, 0), (12, 0))])
            .await
            .unwrap();
        assert_eq!(first.len(), 2);

        let second =
            service.replace_availability(user, vec![window(4, (13, 0), (15, 0))]).await.unwrap();
        assert_eq!(second.len(), 1);

        let remaining = service
            .get_availability(
                user,
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
            )
            .await
            .unwrap();
        // Only the Friday window survives
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].start_time.date(), NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    }

    #[tokio::test]
    async fn replace_rejects_invalid_window_without_writing() {
        let (service, repo) = service_with(Arc::new(RecordingGateway::default()));
        let user = UserId::new();

        let result = service
            .replace_availability(user, vec![window(0, (9, 0), (17, 0)), window(9, (9, 0), (10, 0))])
            .await;
        assert!(matches!(result, Err(SlotbookError::InvalidInput(_))));
        assert!(repo.rules.lock().is_empty());
    }

    #[tokio::test]
    async fn has_availability_matches_weekday() {
        let (service, _repo) = service_with(Arc::new(RecordingGateway::default()));
        let user = UserId::new();
        service.replace_availability(user, vec![window(0, (9, 0), (17, 0))]).await.unwrap();

        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert!(service.has_availability_on_day(user, monday).await.unwrap());
        assert!(!service.has_availability_on_day(user, tuesday).await.unwrap());
    }

    #[tokio::test]
    async fn sync_publishes_next_occurrences() {
        let gateway = Arc::new(RecordingGateway::default());
        let (service, _repo) = service_with(gateway.clone());
        let user = UserId::new();
        // Clock is Wednesday 2025-06-04: Monday resolves to 06-09, Wednesday
        // itself jumps a full week to 06-11
        service
            .replace_availability(user, vec![window(0, (9, 0), (17, 0)), window(2, (8, 0), (12, 0))])
            .await
            .unwrap();

        service.sync_to_platform(user).await.unwrap();

        let published = gateway.published.lock();
        assert_eq!(published.len(), 1);
        let windows = &published[0];
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start.date(), NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        assert_eq!(windows[1].start.date(), NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
    }

    #[tokio::test]
    async fn sync_without_rules_is_a_quiet_no_op() {
        let gateway = Arc::new(RecordingGateway::default());
        let (service, _repo) = service_with(gateway.clone());

        service.sync_to_platform(UserId::new()).await.unwrap();
        assert!(gateway.published.lock().is_empty());
    }
}
