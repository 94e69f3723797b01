//! Clock-time intervals within a single calendar day.
//!
//! Reservations never span midnight: a slot is a half-open interval
//! `[start, end)` of local wall-clock times on the reservation's date.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Wire format for times of day.
pub const TIME_FORMAT: &str = "%H:%M";

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open interval `[start, end)` of local clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
  #[serde(with = "hhmm")]
  pub start: NaiveTime,
  #[serde(with = "hhmm")]
  pub end:   NaiveTime,
}

impl TimeSlot {
  /// Build a slot, returning `None` unless `start < end`.
  pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
    (start < end).then_some(Self { start, end })
  }

  pub fn overlaps(&self, other: &TimeSlot) -> bool {
    self.start < other.end && self.end > other.start
  }

  /// Returns true if `self` lies entirely within `outer`.
  pub fn within(&self, outer: &TimeSlot) -> bool {
    outer.start <= self.start && self.end <= outer.end
  }

  pub fn duration_hours(&self) -> f64 {
    (self.end - self.start).num_seconds() as f64 / 3600.0
  }

  /// Anchor the slot start to a calendar day.
  pub fn starts_at(&self, date: NaiveDate) -> NaiveDateTime { date.and_time(self.start) }
}

/// Parse an `HH:MM` clock time.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
  NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).ok()
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// `serde` adapter storing [`NaiveTime`] as `HH:MM`.
pub mod hhmm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format(super::TIME_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_time(&raw)
      .ok_or_else(|| D::Error::custom(format!("expected HH:MM, got {raw:?}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn slot(a: &str, b: &str) -> TimeSlot {
    TimeSlot::new(parse_time(a).unwrap(), parse_time(b).unwrap()).unwrap()
  }

  #[test]
  fn adjacent_slots_do_not_overlap() {
    assert!(!slot("10:00", "12:00").overlaps(&slot("12:00", "13:00")));
    assert!(!slot("12:00", "13:00").overlaps(&slot("10:00", "12:00")));
  }

  #[test]
  fn partial_and_nested_overlap() {
    assert!(slot("10:00", "12:00").overlaps(&slot("11:00", "13:00")));
    assert!(slot("10:00", "14:00").overlaps(&slot("11:00", "12:00")));
    assert!(slot("11:00", "12:00").overlaps(&slot("10:00", "14:00")));
  }

  #[test]
  fn empty_or_inverted_slot_rejected() {
    let t = parse_time("10:00").unwrap();
    assert!(TimeSlot::new(t, t).is_none());
    assert!(TimeSlot::new(parse_time("11:00").unwrap(), t).is_none());
  }

  #[test]
  fn within_is_inclusive_of_window_edges() {
    let window = slot("08:00", "22:00");
    assert!(slot("08:00", "10:00").within(&window));
    assert!(slot("20:00", "22:00").within(&window));
    assert!(!slot("07:30", "09:00").within(&window));
  }

  #[test]
  fn duration_in_fractional_hours() {
    assert_eq!(slot("09:00", "15:00").duration_hours(), 6.0);
    assert_eq!(slot("09:15", "10:00").duration_hours(), 0.75);
  }

  #[test]
  fn parse_rejects_garbage() {
    assert!(parse_time("25:00").is_none());
    assert!(parse_time("noon").is_none());
    assert!(parse_date("2026-02-30").is_none());
    assert!(parse_date("2026-10-18").is_some());
  }

  #[test]
  fn hhmm_roundtrips_through_json() {
    let s = slot("09:05", "10:30");
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, r#"{"start":"09:05","end":"10:30"}"#);
  }
}
