//! Error taxonomy for `lumina-core`.
//!
//! Every booking operation fails with exactly one [`BookingError`]. Numeric
//! threshold failures carry both the offending value and the limit so callers
//! can render an actionable message.

use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
  #[error("malformed request: {0}")]
  MalformedRequest(String),

  #[error("invalid amenity: {0}")]
  InvalidAmenity(String),

  #[error("building configuration unavailable: {0}")]
  ConfigurationUnavailable(String),

  #[error(
    "end time {} must be after start time {}",
    .end.format("%H:%M"),
    .start.format("%H:%M")
  )]
  InvalidInterval { start: NaiveTime, end: NaiveTime },

  #[error(
    "amenity is open {} to {}",
    .open.format("%H:%M"),
    .close.format("%H:%M")
  )]
  OutsideOperatingHours { open: NaiveTime, close: NaiveTime },

  #[error("requested {requested_hours:.1}h, max {max_hours}h")]
  DurationExceeded { requested_hours: f64, max_hours: f64 },

  #[error(
    "bookings need at least {required_hours}h notice, requested with {notice_hours:.1}h"
  )]
  InsufficientNotice { notice_hours: f64, required_hours: f64 },

  #[error("{active} active bookings, max {max}")]
  ActiveLimitReached { active: u32, max: u32 },

  #[error("time slot overlaps an existing reservation")]
  SlotUnavailable,

  #[error("reservation not found: {0}")]
  NotFound(Uuid),

  #[error("not permitted to act on {0}")]
  Forbidden(Uuid),

  #[error("store unavailable: {0}")]
  StoreUnavailable(String),
}

impl BookingError {
  /// Stable machine-readable reason code.
  pub fn reason(&self) -> &'static str {
    match self {
      Self::MalformedRequest(_) => "malformed_request",
      Self::InvalidAmenity(_) => "invalid_amenity",
      Self::ConfigurationUnavailable(_) => "configuration_unavailable",
      Self::InvalidInterval { .. } => "invalid_interval",
      Self::OutsideOperatingHours { .. } => "outside_operating_hours",
      Self::DurationExceeded { .. } => "duration_exceeded",
      Self::InsufficientNotice { .. } => "insufficient_notice",
      Self::ActiveLimitReached { .. } => "active_limit_reached",
      Self::SlotUnavailable => "slot_unavailable",
      Self::NotFound(_) => "not_found",
      Self::Forbidden(_) => "forbidden",
      Self::StoreUnavailable(_) => "store_unavailable",
    }
  }

  /// Only transient infrastructure failures are worth retrying; everything
  /// else requires the caller to change the request.
  pub fn is_retryable(&self) -> bool { matches!(self, Self::StoreUnavailable(_)) }

  /// Wrap any backend fault as [`BookingError::StoreUnavailable`].
  pub fn store(err: impl std::fmt::Display) -> Self {
    Self::StoreUnavailable(err.to_string())
  }
}

pub type Result<T, E = BookingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duration_detail_matches_wire_format() {
    let e = BookingError::DurationExceeded {
      requested_hours: 6.0,
      max_hours:       4.0,
    };
    assert_eq!(e.to_string(), "requested 6.0h, max 4h");
    assert_eq!(e.reason(), "duration_exceeded");
  }

  #[test]
  fn fractional_limits_are_rendered_exactly() {
    let e = BookingError::InsufficientNotice {
      notice_hours:   1.5,
      required_hours: 0.5,
    };
    assert_eq!(
      e.to_string(),
      "bookings need at least 0.5h notice, requested with 1.5h"
    );
  }

  #[test]
  fn only_store_faults_are_retryable() {
    assert!(BookingError::StoreUnavailable("busy".into()).is_retryable());
    assert!(!BookingError::SlotUnavailable.is_retryable());
    assert!(!BookingError::MalformedRequest("x".into()).is_retryable());
  }
}
