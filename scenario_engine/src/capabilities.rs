//! External capabilities the engine calls into: the XP ledger and the clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use scenario_rules::UserId;
use thiserror::Error;

/// Source of timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Error)]
pub enum XpError {
    #[error("xp ledger unavailable: {0}")]
    Unavailable(String),

    #[error("xp award rejected: {0}")]
    Rejected(String),
}

/// The experience-point ledger owned by another subsystem.
pub trait XpLedger: Send + Sync {
    fn award(&self, user_id: &UserId, amount: u32, reason: &str) -> Result<(), XpError>;
}

impl<T: XpLedger + ?Sized> XpLedger for &T {
    fn award(&self, user_id: &UserId, amount: u32, reason: &str) -> Result<(), XpError> {
        (**self).award(user_id, amount, reason)
    }
}

impl<T: XpLedger + ?Sized> XpLedger for Arc<T> {
    fn award(&self, user_id: &UserId, amount: u32, reason: &str) -> Result<(), XpError> {
        (**self).award(user_id, amount, reason)
    }
}

/// One award accepted by a [`RecordingXpLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpAward {
    pub user_id: UserId,
    pub amount: u32,
    pub reason: String,
}

/// In-process ledger that keeps every award it receives.
#[derive(Debug, Default)]
pub struct RecordingXpLedger {
    awards: Mutex<Vec<XpAward>>,
}

impl RecordingXpLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn awards(&self) -> Vec<XpAward> {
        self.awards.lock().clone()
    }

    /// Total XP awarded to `user_id` so far.
    pub fn total_for(&self, user_id: &UserId) -> u64 {
        self.awards
            .lock()
            .iter()
            .filter(|a| &a.user_id == user_id)
            .map(|a| u64::from(a.amount))
            .sum()
    }
}

impl XpLedger for RecordingXpLedger {
    fn award(&self, user_id: &UserId, amount: u32, reason: &str) -> Result<(), XpError> {
        self.awards.lock().push(XpAward {
            user_id: user_id.clone(),
            amount,
            reason: reason.to_string(),
        });
        Ok(())
    }
}
