//! Residents and the authenticated requester.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Resident,
  Admin,
}

/// A person who lives in (or administers) a building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
  pub resident_id: Uuid,
  pub building_id: Uuid,
  pub name:        String,
  pub email:       String,
  /// Apartment identifier, e.g. `5-B`. Admins usually have none.
  pub unit:        Option<String>,
  pub role:        Role,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::BookingStore::add_resident`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewResident {
  pub building_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub unit:        Option<String>,
  pub role:        Role,
}

/// The identity on whose behalf an operation runs. Always resolved from an
/// authenticated credential, never from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
  pub resident_id: Uuid,
  pub building_id: Uuid,
  pub role:        Role,
}

impl Requester {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  /// Admins act on anything in their own building.
  pub fn administers(&self, building_id: Uuid) -> bool {
    self.is_admin() && self.building_id == building_id
  }
}

impl From<&Resident> for Requester {
  fn from(r: &Resident) -> Self {
    Self {
      resident_id: r.resident_id,
      building_id: r.building_id,
      role:        r.role,
    }
  }
}
