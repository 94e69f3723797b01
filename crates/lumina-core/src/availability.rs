//! Hourly slot grid for an amenity on one day.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::{amenity::Amenity, reservation::Reservation, slot::TimeSlot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
  #[serde(flatten)]
  pub slot:      TimeSlot,
  pub available: bool,
}

/// Split `[open, close)` into slots starting on each hour boundary at or after
/// `open`. The first slot starts at `open` and the last is clipped to `close`.
pub fn hourly_slots(window: &TimeSlot) -> Vec<TimeSlot> {
  let mut slots = Vec::new();
  let mut start = window.start;
  while start < window.end {
    let end = next_hour(start).map_or(window.end, |h| h.min(window.end));
    slots.push(TimeSlot { start, end });
    start = end;
  }
  slots
}

fn next_hour(t: NaiveTime) -> Option<NaiveTime> {
  NaiveTime::from_hms_opt(t.hour() + 1, 0, 0)
}

/// Mark each hourly slot free unless a CONFIRMED reservation overlaps it.
/// `reservations` should all belong to `amenity` on the day in question.
pub fn day_grid(amenity: &Amenity, reservations: &[Reservation]) -> Vec<SlotAvailability> {
  let booked: Vec<TimeSlot> = reservations
    .iter()
    .filter(|r| r.is_confirmed())
    .map(Reservation::slot)
    .collect();

  hourly_slots(&amenity.operating_window())
    .into_iter()
    .map(|slot| SlotAvailability {
      available: !booked.iter().any(|b| b.overlaps(&slot)),
      slot,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{reservation::ReservationStatus, slot::parse_time};

  fn t(s: &str) -> NaiveTime { parse_time(s).unwrap() }

  fn amenity(open: &str, close: &str) -> Amenity {
    Amenity {
      amenity_id:  Uuid::new_v4(),
      building_id: Uuid::new_v4(),
      name:        "Rooftop Pool".into(),
      description: String::new(),
      capacity:    10,
      open_time:   t(open),
      close_time:  t(close),
    }
  }

  fn booking(a: &Amenity, start: &str, end: &str, status: ReservationStatus) -> Reservation {
    Reservation {
      reservation_id: Uuid::new_v4(),
      amenity_id:     a.amenity_id,
      building_id:    a.building_id,
      resident_id:    Uuid::new_v4(),
      date:           NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
      start_time:     t(start),
      end_time:       t(end),
      status,
      created_at:     Utc::now(),
    }
  }

  #[test]
  fn whole_hours_window() {
    let slots = hourly_slots(&TimeSlot { start: t("08:00"), end: t("11:00") });
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0], TimeSlot { start: t("08:00"), end: t("09:00") });
    assert_eq!(slots[2], TimeSlot { start: t("10:00"), end: t("11:00") });
  }

  #[test]
  fn ragged_window_is_clipped() {
    let slots = hourly_slots(&TimeSlot { start: t("08:30"), end: t("10:15") });
    assert_eq!(
      slots,
      vec![
        TimeSlot { start: t("08:30"), end: t("09:00") },
        TimeSlot { start: t("09:00"), end: t("10:00") },
        TimeSlot { start: t("10:00"), end: t("10:15") },
      ]
    );
  }

  #[test]
  fn window_ending_at_midnight_edge() {
    let slots = hourly_slots(&TimeSlot { start: t("22:00"), end: t("23:59") });
    assert_eq!(slots, vec![TimeSlot { start: t("22:00"), end: t("23:00") }, TimeSlot {
      start: t("23:00"),
      end:   t("23:59"),
    }]);
  }

  #[test]
  fn confirmed_bookings_block_overlapping_slots_only() {
    let a = amenity("08:00", "12:00");
    let grid = day_grid(&a, &[
      booking(&a, "09:00", "10:30", ReservationStatus::Confirmed),
      booking(&a, "11:00", "12:00", ReservationStatus::Cancelled),
    ]);
    let free: Vec<bool> = grid.iter().map(|s| s.available).collect();
    assert_eq!(free, vec![true, false, false, true]);
  }
}
