//! Port interfaces for availability rule storage
//!
//! These traits define the boundary between core business logic and
//! infrastructure implementations.

use async_trait::async_trait;
use slotbook_domain::{AvailabilityRule, AvailabilityUpdate, Result, UserId};

/// Trait for persisting weekly availability rules.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// All rules for a user, ordered by day of week then start time.
    async fn rules_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityRule>>;

    /// Rules for a user matching one day of week (0 = Monday .. 6 = Sunday).
    async fn rules_for_day(&self, user_id: UserId, day_of_week: u8) -> Result<Vec<AvailabilityRule>>;

    /// Replace the user's full rule set in one transaction
    /// (delete-all-then-insert, never an incremental patch).
    async fn replace_all(
        &self,
        user_id: UserId,
        windows: &[AvailabilityUpdate],
    ) -> Result<Vec<AvailabilityRule>>;
}
