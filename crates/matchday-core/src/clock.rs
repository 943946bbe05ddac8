//! Time sources.
//!
//! Everything that depends on "now" (period rotation, match timestamps) reads
//! it through a [`Clock`] so tests can move time forward deterministically.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self { Self { now: Mutex::new(start) } }

  pub fn set(&self, to: DateTime<Utc>) { *self.lock() = to; }

  pub fn advance(&self, by: TimeDelta) {
    let mut now = self.lock();
    *now += by;
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
    // A poisoned guard still holds a valid timestamp.
    self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> { *self.lock() }
}
