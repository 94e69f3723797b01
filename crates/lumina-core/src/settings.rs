//! Configuration Resolver — effective per-building booking rules.
//!
//! Buildings store their rules as free-form key/value rows. Each validation
//! run resolves its own snapshot; nothing here is cached or shared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BookingError, Result, amenity::Amenity, store::BookingStore};

pub const KEY_MIN_HOURS_ADVANCE: &str = "min_hours_advance";
pub const KEY_MAX_DURATION: &str = "max_duration";
pub const KEY_MAX_ACTIVE_BOOKINGS: &str = "max_active_bookings";

pub const DEFAULT_MIN_HOURS_ADVANCE: f64 = 24.0;
pub const DEFAULT_MAX_DURATION: f64 = 4.0;
pub const DEFAULT_MAX_ACTIVE_BOOKINGS: u32 = 3;

/// One stored `(building, key, value)` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
  pub building_id: Uuid,
  pub key:         String,
  pub value:       String,
}

/// The resolved booking limits for a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookingSettings {
  /// Minimum hours between "now" and the reservation start.
  pub min_hours_advance:   f64,
  /// Longest single reservation, in hours.
  pub max_duration:        f64,
  /// Most CONFIRMED reservations a resident may hold from today onwards.
  pub max_active_bookings: u32,
}

impl Default for BookingSettings {
  fn default() -> Self {
    Self {
      min_hours_advance:   DEFAULT_MIN_HOURS_ADVANCE,
      max_duration:        DEFAULT_MAX_DURATION,
      max_active_bookings: DEFAULT_MAX_ACTIVE_BOOKINGS,
    }
  }
}

impl BookingSettings {
  /// Merge stored entries over the defaults. Each key falls back on its own
  /// when missing, non-numeric or out of range; unknown keys are ignored.
  pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a SettingEntry>) -> Self {
    let mut settings = Self::default();
    for entry in entries {
      let Some(n) = numeric(&entry.value) else { continue };
      match entry.key.as_str() {
        KEY_MIN_HOURS_ADVANCE if n >= 0.0 => settings.min_hours_advance = n,
        KEY_MAX_DURATION if n > 0.0 => settings.max_duration = n,
        KEY_MAX_ACTIVE_BOOKINGS if n >= 1.0 && n <= u32::MAX as f64 => {
          settings.max_active_bookings = n.floor() as u32
        }
        _ => {}
      }
    }
    settings
  }
}

/// Interpret a stored value as a number. Accepts plain text (`24`), JSON
/// numbers and JSON strings wrapping a number (`"24"`).
fn numeric(raw: &str) -> Option<f64> {
  let n = match serde_json::from_str::<serde_json::Value>(raw) {
    Ok(serde_json::Value::Number(n)) => n.as_f64(),
    Ok(serde_json::Value::String(s)) => s.trim().parse().ok(),
    _ => raw.trim().parse().ok(),
  }?;
  n.is_finite().then_some(n)
}

/// An amenity together with the effective rules of its building.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
  pub amenity:  Amenity,
  pub settings: BookingSettings,
}

/// Look up the amenity, then its building's settings.
///
/// - unknown amenity → [`BookingError::InvalidAmenity`]
/// - failing settings lookup → [`BookingError::ConfigurationUnavailable`]
///
/// A building with no stored entries is valid and resolves to the defaults.
pub async fn resolve<S: BookingStore>(store: &S, amenity_id: Uuid) -> Result<ResolvedConfiguration> {
  let amenity = store
    .get_amenity(amenity_id)
    .await
    .map_err(BookingError::store)?
    .ok_or_else(|| BookingError::InvalidAmenity(amenity_id.to_string()))?;

  let entries = store
    .building_settings(amenity.building_id)
    .await
    .map_err(|e| {
      tracing::warn!(building_id = %amenity.building_id, "settings lookup failed: {e}");
      BookingError::ConfigurationUnavailable(e.to_string())
    })?;

  Ok(ResolvedConfiguration {
    settings: BookingSettings::from_entries(&entries),
    amenity,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(key: &str, value: &str) -> SettingEntry {
    SettingEntry {
      building_id: Uuid::nil(),
      key:         key.into(),
      value:       value.into(),
    }
  }

  #[test]
  fn empty_building_gets_defaults() {
    let s = BookingSettings::from_entries(&Vec::<SettingEntry>::new());
    assert_eq!(s, BookingSettings::default());
    assert_eq!(s.min_hours_advance, 24.0);
    assert_eq!(s.max_duration, 4.0);
    assert_eq!(s.max_active_bookings, 3);
  }

  #[test]
  fn each_key_defaults_independently() {
    let s = BookingSettings::from_entries(&[
      entry(KEY_MAX_DURATION, "2"),
      entry(KEY_MIN_HOURS_ADVANCE, "soon"),
    ]);
    assert_eq!(s.max_duration, 2.0);
    assert_eq!(s.min_hours_advance, DEFAULT_MIN_HOURS_ADVANCE);
    assert_eq!(s.max_active_bookings, DEFAULT_MAX_ACTIVE_BOOKINGS);
  }

  #[test]
  fn json_encoded_values_are_accepted() {
    let s = BookingSettings::from_entries(&[
      entry(KEY_MIN_HOURS_ADVANCE, "\"12\""),
      entry(KEY_MAX_DURATION, "1.5"),
      entry(KEY_MAX_ACTIVE_BOOKINGS, " 5 "),
    ]);
    assert_eq!(s.min_hours_advance, 12.0);
    assert_eq!(s.max_duration, 1.5);
    assert_eq!(s.max_active_bookings, 5);
  }

  #[test]
  fn degenerate_values_fall_back() {
    let s = BookingSettings::from_entries(&[
      entry(KEY_MIN_HOURS_ADVANCE, "0"),
      entry(KEY_MAX_DURATION, "0"),
      entry(KEY_MAX_ACTIVE_BOOKINGS, "-2"),
    ]);
    assert_eq!(s.min_hours_advance, 0.0);
    assert_eq!(s.max_duration, DEFAULT_MAX_DURATION);
    assert_eq!(s.max_active_bookings, DEFAULT_MAX_ACTIVE_BOOKINGS);
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let s = BookingSettings::from_entries(&[entry("pool_heating", "on"), entry("x", "9")]);
    assert_eq!(s, BookingSettings::default());
  }
}
