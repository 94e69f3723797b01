//! Source of "now" for validation.
//!
//! Reservation dates and times are building-local wall-clock values, so the
//! clock hands out naive local date-times.

use chrono::NaiveDateTime;

pub trait Clock: Send + Sync {
  fn now(&self) -> NaiveDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime { chrono::Local::now().naive_local() }
}

/// A clock frozen at one instant. Useful for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime { self.0 }
}
