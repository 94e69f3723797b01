//! Buildings and the amenities they own.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slot::{TimeSlot, hhmm};

/// A residential building. Owns amenities, residents and booking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
  pub building_id: Uuid,
  pub name:        String,
  pub created_at:  DateTime<Utc>,
}

/// A shared bookable resource with a daily operating window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amenity {
  pub amenity_id:  Uuid,
  pub building_id: Uuid,
  pub name:        String,
  pub description: String,
  pub capacity:    u32,
  #[serde(with = "hhmm")]
  pub open_time:   NaiveTime,
  #[serde(with = "hhmm")]
  pub close_time:  NaiveTime,
}

impl Amenity {
  /// The operating window as a slot. Amenities are only ever stored with
  /// `open_time < close_time`.
  pub fn operating_window(&self) -> TimeSlot {
    TimeSlot {
      start: self.open_time,
      end:   self.close_time,
    }
  }
}

/// Input to [`crate::store::BookingStore::add_amenity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAmenity {
  pub building_id: Uuid,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub capacity:    u32,
  #[serde(with = "hhmm")]
  pub open_time:   NaiveTime,
  #[serde(with = "hhmm")]
  pub close_time:  NaiveTime,
}
