//! Per-user advisory locks
//!
//! The validator's check-then-act sequence is not atomic on its own: two
//! concurrent creates for overlapping slots could both pass validation and
//! both commit. Lifecycle operations for a user serialize on this lock
//! across check + write. Cross-user operations never contend.
//!
//! The lock is released before any external-platform call; a slow network
//! call must not extend the critical section.

use std::sync::Arc;

use dashmap::DashMap;
use slotbook_domain::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of per-user mutexes. Entries are created on first use and kept for
/// the process lifetime; one entry per user is negligible.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a user, waiting behind any in-flight operation
    /// for the same user.
    pub async fn acquire(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock =
            self.locks.entry(user_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        lock.lock_owned().await
    }
}
