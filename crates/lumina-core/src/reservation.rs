//! Reservations — one claim on an amenity for a time slot on one day.
//!
//! A reservation is created only by a successful validation run and is never
//! mutated afterwards except for the CONFIRMED → CANCELLED transition.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  BookingError, Result,
  slot::{TimeSlot, hhmm, parse_date, parse_time},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
  Confirmed,
  Cancelled,
  /// Terminal; reached by time passing, never produced by the validator.
  Completed,
}

impl ReservationStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Confirmed => "confirmed",
      Self::Cancelled => "cancelled",
      Self::Completed => "completed",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "confirmed" => Some(Self::Confirmed),
      "cancelled" => Some(Self::Cancelled),
      "completed" => Some(Self::Completed),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
  pub reservation_id: Uuid,
  pub amenity_id:     Uuid,
  pub building_id:    Uuid,
  pub resident_id:    Uuid,
  pub date:           NaiveDate,
  #[serde(with = "hhmm")]
  pub start_time:     NaiveTime,
  #[serde(with = "hhmm")]
  pub end_time:       NaiveTime,
  pub status:         ReservationStatus,
  pub created_at:     DateTime<Utc>,
}

impl Reservation {
  pub fn is_confirmed(&self) -> bool { self.status == ReservationStatus::Confirmed }

  pub fn slot(&self) -> TimeSlot {
    TimeSlot {
      start: self.start_time,
      end:   self.end_time,
    }
  }
}

// ─── Raw request ─────────────────────────────────────────────────────────────

/// A booking request exactly as the client sent it. Every field is optional
/// so that absence is reported as [`BookingError::MalformedRequest`] rather
/// than a transport-level decoding failure.
///
/// Has no requester field: identity comes from the authenticated credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationRequest {
  pub amenity_id: Option<String>,
  pub date:       Option<String>,
  pub start_time: Option<String>,
  pub end_time:   Option<String>,
}

/// A request whose fields have all been parsed. The slot may still be
/// inverted; interval sanity is a separate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRequest {
  pub amenity_id: Uuid,
  pub date:       NaiveDate,
  pub start:      NaiveTime,
  pub end:        NaiveTime,
}

impl ReservationRequest {
  pub fn new(amenity_id: Uuid, date: &str, start_time: &str, end_time: &str) -> Self {
    Self {
      amenity_id: Some(amenity_id.to_string()),
      date:       Some(date.to_owned()),
      start_time: Some(start_time.to_owned()),
      end_time:   Some(end_time.to_owned()),
    }
  }

  /// Field presence and well-formedness.
  pub fn parse(&self) -> Result<ParsedRequest> {
    let amenity_raw = required("amenity_id", &self.amenity_id)?;
    let date_raw = required("date", &self.date)?;
    let start_raw = required("start_time", &self.start_time)?;
    let end_raw = required("end_time", &self.end_time)?;

    let amenity_id = Uuid::parse_str(amenity_raw.trim()).map_err(|_| {
      BookingError::MalformedRequest(format!("amenity_id is not a valid id: {amenity_raw:?}"))
    })?;
    let date = parse_date(date_raw).ok_or_else(|| {
      BookingError::MalformedRequest(format!("date must be YYYY-MM-DD, got {date_raw:?}"))
    })?;
    let start = parse_time(start_raw).ok_or_else(|| {
      BookingError::MalformedRequest(format!("start_time must be HH:MM, got {start_raw:?}"))
    })?;
    let end = parse_time(end_raw).ok_or_else(|| {
      BookingError::MalformedRequest(format!("end_time must be HH:MM, got {end_raw:?}"))
    })?;

    Ok(ParsedRequest { amenity_id, date, start, end })
  }
}

fn required<'a>(name: &str, field: &'a Option<String>) -> Result<&'a str> {
  match field.as_deref() {
    Some(v) if !v.trim().is_empty() => Ok(v),
    _ => Err(BookingError::MalformedRequest(format!("missing required field: {name}"))),
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::BookingStore::list_reservations`].
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
  pub building_id: Option<Uuid>,
  pub resident_id: Option<Uuid>,
  pub amenity_id:  Option<Uuid>,
  pub date:        Option<NaiveDate>,
  pub status:      Option<ReservationStatus>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_well_formed_request() {
    let id = Uuid::new_v4();
    let parsed = ReservationRequest::new(id, "2026-10-18", "10:00", "12:00")
      .parse()
      .unwrap();
    assert_eq!(parsed.amenity_id, id);
    assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
  }

  #[test]
  fn missing_field_is_malformed() {
    let mut req = ReservationRequest::new(Uuid::new_v4(), "2026-10-18", "10:00", "12:00");
    req.end_time = None;
    let err = req.parse().unwrap_err();
    assert!(matches!(err, BookingError::MalformedRequest(ref m) if m.contains("end_time")));
  }

  #[test]
  fn blank_field_is_malformed() {
    let mut req = ReservationRequest::new(Uuid::new_v4(), "2026-10-18", "10:00", "12:00");
    req.date = Some("   ".into());
    assert!(matches!(req.parse(), Err(BookingError::MalformedRequest(_))));
  }

  #[test]
  fn unparseable_values_are_malformed() {
    let id = Uuid::new_v4();
    for (date, start, end) in [
      ("18/10/2026", "10:00", "12:00"),
      ("2026-10-18", "10am", "12:00"),
      ("2026-10-18", "10:00", "24:00"),
    ] {
      let req = ReservationRequest::new(id, date, start, end);
      assert!(matches!(req.parse(), Err(BookingError::MalformedRequest(_))), "{date} {start} {end}");
    }

    let req = ReservationRequest {
      amenity_id: Some("pool".into()),
      ..ReservationRequest::new(id, "2026-10-18", "10:00", "12:00")
    };
    assert!(matches!(req.parse(), Err(BookingError::MalformedRequest(_))));
  }

  #[test]
  fn inverted_interval_still_parses() {
    let parsed = ReservationRequest::new(Uuid::new_v4(), "2026-10-18", "12:00", "10:00")
      .parse()
      .unwrap();
    assert!(parsed.end < parsed.start);
  }

  #[test]
  fn status_strings_roundtrip() {
    for s in [
      ReservationStatus::Confirmed,
      ReservationStatus::Cancelled,
      ReservationStatus::Completed,
    ] {
      assert_eq!(ReservationStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(ReservationStatus::parse("pending"), None);
  }
}
