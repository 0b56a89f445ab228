//! Shared in-memory test doubles for core service tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use slotbook_common::testing::MockClock;
use slotbook_core::availability::ports::AvailabilityRepository;
use slotbook_core::booking::ports::AppointmentRepository;
use slotbook_core::platform_ports::{
    AvailabilityWindow, BookingGateway, BookingRequest, ExternalBooking,
};
use slotbook_core::{AppointmentService, AvailabilityService};
use slotbook_domain::{
    Appointment, AppointmentId, AvailabilityRule, AvailabilityUpdate, Result, RuleId,
    SlotbookError, UserId,
};

/// In-memory implementation of both storage ports.
/// Flip `fail_bookkeeping` to make `set_external_booking_id` fail.
#[derive(Default)]
pub struct InMemoryStore {
    pub rules: Mutex<Vec<AvailabilityRule>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub fail_bookkeeping: AtomicBool,
}

#[async_trait]
impl AvailabilityRepository for InMemoryStore {
    async fn rules_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityRule>> {
        let mut rules: Vec<_> = self
            .rules
            .lock()
            .expect("rules lock")
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rules.sort_by_key(|r| (r.day_of_week, r.start_time));
        Ok(rules)
    }

    async fn rules_for_day(&self, user_id: UserId, day: u8) -> Result<Vec<AvailabilityRule>> {
        Ok(self
            .rules
            .lock()
            .expect("rules lock")
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
        let mut rules = self.rules.lock().expect("rules lock");
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

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        self.appointments.lock().expect("appointments lock").push(appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<()> {
        let mut appointments = self.appointments.lock().expect("appointments lock");
        let slot = appointments
            .iter_mut()
            .find(|a| a.id == appointment.id && a.user_id == appointment.user_id)
            .ok_or_else(|| SlotbookError::NotFound("no such appointment".into()))?;
        *slot = appointment.clone();
        Ok(())
    }

    async fn delete(&self, user_id: UserId, id: AppointmentId) -> Result<bool> {
        let mut appointments = self.appointments.lock().expect("appointments lock");
        let before = appointments.len();
        appointments.retain(|a| !(a.id == id && a.user_id == user_id));
        Ok(appointments.len() < before)
    }

    async fn find(&self, user_id: UserId, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self
            .appointments
            .lock()
            .expect("appointments lock")
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn list(
        &self,
        user_id: UserId,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<Appointment>> {
        let mut result: Vec<_> = self
            .appointments
            .lock()
            .expect("appointments lock")
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter(|a| from.map_or(true, |f| a.start_time >= f))
            .filter(|a| to.map_or(true, |t| a.start_time <= t))
            .cloned()
            .collect();
        result.sort_by_key(|a| a.start_time);
        Ok(result)
    }

    async fn list_after(&self, user_id: UserId, after: NaiveDateTime) -> Result<Vec<Appointment>> {
        let mut result: Vec<_> = self
            .appointments
            .lock()
            .expect("appointments lock")
            .iter()
            .filter(|a| a.user_id == user_id && a.start_time > after)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.start_time);
        Ok(result)
    }

    async fn set_external_booking_id(
        &self,
        user_id: UserId,
        id: AppointmentId,
        external_id: &str,
    ) -> Result<()> {
        if self.fail_bookkeeping.load(Ordering::SeqCst) {
            return Err(SlotbookError::ConcurrencyConflict("database is busy".into()));
        }
        let mut appointments = self.appointments.lock().expect("appointments lock");
        if let Some(appointment) =
            appointments.iter_mut().find(|a| a.id == id && a.user_id == user_id)
        {
            appointment.external_booking_id = Some(external_id.to_string());
        }
        Ok(())
    }
}

/// Gateway double that hands out sequential external ids and records calls.
/// Flip `fail` to make every call return an ExternalSync error.
#[derive(Default)]
pub struct ScriptedGateway {
    pub fail: AtomicBool,
    next_id: AtomicU32,
    pub creates: Mutex<Vec<BookingRequest>>,
    pub updates: Mutex<Vec<(String, BookingRequest)>>,
    pub deletes: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(SlotbookError::ExternalSync("platform unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BookingGateway for ScriptedGateway {
    async fn create_booking(&self, request: &BookingRequest) -> Result<Option<ExternalBooking>> {
        self.check()?;
        self.creates.lock().expect("creates lock").push(request.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ExternalBooking { external_id: format!("ext-{id}") }))
    }

    async fn update_booking(&self, external_id: &str, request: &BookingRequest) -> Result<()> {
        self.check()?;
        self.updates
            .lock()
            .expect("updates lock")
            .push((external_id.to_string(), request.clone()));
        Ok(())
    }

    async fn delete_booking(&self, external_id: &str) -> Result<()> {
        self.check()?;
        self.deletes.lock().expect("deletes lock").push(external_id.to_string());
        Ok(())
    }

    async fn publish_availability(&self, _windows: &[AvailabilityWindow]) -> Result<()> {
        self.check()
    }
}

/// Fully wired service pair over shared in-memory storage and a pinned
/// clock (Sunday 2025-06-01 12:00, so the following Monday is bookable).
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub clock: MockClock,
    pub appointments: Arc<AppointmentService>,
    pub availability: AvailabilityService,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let gateway = Arc::new(ScriptedGateway::default());
        let clock = MockClock::at(
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .expect("valid date")
                .and_hms_opt(12, 0, 0)
                .expect("valid time"),
        );

        let appointments = Arc::new(AppointmentService::new(
            store.clone(),
            store.clone(),
            gateway.clone(),
            Arc::new(clock.clone()),
        ));
        let availability = AvailabilityService::new(
            store.clone(),
            gateway.clone(),
            Arc::new(clock.clone()),
        );

        Self { store, gateway, clock, appointments, availability }
    }

    /// Install a Monday 09:00-17:00 rule for the user.
    pub async fn with_monday_hours(&self, user: UserId) {
        self.availability
            .replace_availability(
                user,
                vec![AvailabilityUpdate {
                    day_of_week: 0,
                    start_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
                    end_time: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
                }],
            )
            .await
            .expect("rule replacement succeeds");
    }
}

/// Monday 2025-06-02 at the given wall-clock time.
pub fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .expect("valid date")
        .and_hms_opt(h, m, 0)
        .expect("valid time")
}
