//! Building administration: amenities, settings and residents.
//!
//! Reads are open to anyone in the building; writes require the admin role.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
  BookingError, Result,
  amenity::{Amenity, Building, NewAmenity},
  booking::BookingService,
  resident::{NewResident, Requester, Resident, Role},
  settings::{
    BookingSettings, KEY_MAX_ACTIVE_BOOKINGS, KEY_MAX_DURATION, KEY_MIN_HOURS_ADVANCE,
    SettingEntry,
  },
  store::BookingStore,
  token,
};

/// Partial update of a building's booking rules. Absent fields are left as
/// they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
  pub min_hours_advance:   Option<f64>,
  pub max_duration:        Option<f64>,
  pub max_active_bookings: Option<u32>,
}

/// A resident just registered, with the only copy of their bearer token.
#[derive(Debug, Clone)]
pub struct Enrolment {
  pub resident: Resident,
  pub token:    String,
}

impl<S: BookingStore> BookingService<S> {
  // ── Amenities ─────────────────────────────────────────────────────────

  pub async fn amenities(&self, requester: &Requester) -> Result<Vec<Amenity>> {
    self
      .store()
      .list_amenities(requester.building_id)
      .await
      .map_err(BookingError::store)
  }

  /// An amenity in the requester's building. Amenities elsewhere are
  /// reported as unknown.
  pub async fn amenity(&self, requester: &Requester, amenity_id: Uuid) -> Result<Amenity> {
    self
      .store()
      .get_amenity(amenity_id)
      .await
      .map_err(BookingError::store)?
      .filter(|a| a.building_id == requester.building_id)
      .ok_or_else(|| BookingError::InvalidAmenity(amenity_id.to_string()))
  }

  pub async fn create_amenity(&self, requester: &Requester, input: NewAmenity) -> Result<Amenity> {
    require_admin(requester, input.building_id)?;
    if input.name.trim().is_empty() {
      return Err(BookingError::MalformedRequest("amenity name must not be empty".into()));
    }
    if input.open_time >= input.close_time {
      return Err(BookingError::MalformedRequest(
        "open_time must be before close_time".into(),
      ));
    }
    if input.capacity == 0 {
      return Err(BookingError::MalformedRequest("capacity must be at least 1".into()));
    }

    let amenity = self.store().add_amenity(input).await.map_err(BookingError::store)?;
    info!(amenity_id = %amenity.amenity_id, name = %amenity.name, "amenity created");
    Ok(amenity)
  }

  // ── Settings ──────────────────────────────────────────────────────────

  /// The effective rules for the requester's building.
  pub async fn settings(&self, requester: &Requester) -> Result<BookingSettings> {
    let entries = self
      .store()
      .building_settings(requester.building_id)
      .await
      .map_err(|e| BookingError::ConfigurationUnavailable(e.to_string()))?;
    Ok(BookingSettings::from_entries(&entries))
  }

  /// Store the set fields of `patch` and return the resulting rules.
  pub async fn update_settings(
    &self,
    requester: &Requester,
    patch: SettingsPatch,
  ) -> Result<BookingSettings> {
    require_admin(requester, requester.building_id)?;

    let mut updates = Vec::new();
    if let Some(v) = patch.min_hours_advance {
      if !v.is_finite() || v < 0.0 {
        return Err(BookingError::MalformedRequest(
          "min_hours_advance must be zero or more".into(),
        ));
      }
      updates.push((KEY_MIN_HOURS_ADVANCE, v.to_string()));
    }
    if let Some(v) = patch.max_duration {
      if !v.is_finite() || v <= 0.0 {
        return Err(BookingError::MalformedRequest("max_duration must be positive".into()));
      }
      updates.push((KEY_MAX_DURATION, v.to_string()));
    }
    if let Some(v) = patch.max_active_bookings {
      if v == 0 {
        return Err(BookingError::MalformedRequest(
          "max_active_bookings must be at least 1".into(),
        ));
      }
      updates.push((KEY_MAX_ACTIVE_BOOKINGS, v.to_string()));
    }

    for (key, value) in updates {
      info!(building_id = %requester.building_id, key, value = %value, "setting updated");
      self
        .store()
        .put_setting(SettingEntry {
          building_id: requester.building_id,
          key: key.to_owned(),
          value,
        })
        .await
        .map_err(BookingError::store)?;
    }

    self.settings(requester).await
  }

  // ── Residents ─────────────────────────────────────────────────────────

  pub async fn residents(&self, requester: &Requester) -> Result<Vec<Resident>> {
    require_admin(requester, requester.building_id)?;
    self
      .store()
      .list_residents(requester.building_id)
      .await
      .map_err(BookingError::store)
  }

  /// Register a resident in the requester's building and mint their token.
  pub async fn enrol(&self, requester: &Requester, input: NewResident) -> Result<Enrolment> {
    require_admin(requester, input.building_id)?;
    self.register(input).await
  }

  /// Create a building with its first administrator. Used once, out of band,
  /// to seed a deployment. Either both are created or neither is.
  pub async fn bootstrap(
    &self,
    building_name: &str,
    admin_name: &str,
    admin_email: &str,
  ) -> Result<(Building, Enrolment)> {
    let building_name = building_name.trim();
    if building_name.is_empty() {
      return Err(BookingError::MalformedRequest("building name must not be empty".into()));
    }
    let admin = normalise(NewResident {
      building_id: Uuid::nil(),
      name:        admin_name.to_owned(),
      email:       admin_email.to_owned(),
      unit:        None,
      role:        Role::Admin,
    })?;

    let issued = token::issue();
    let email = admin.email.clone();
    let (building, resident) = self
      .store()
      .add_building_with_admin(building_name.to_owned(), admin, issued.digest)
      .await
      .map_err(BookingError::store)?
      .ok_or_else(|| already_registered(&email))?;
    info!(building_id = %building.building_id, name = %building.name, "building created");
    info!(resident_id = %resident.resident_id, role = ?resident.role, "resident registered");

    Ok((building, Enrolment { resident, token: issued.token }))
  }

  async fn register(&self, input: NewResident) -> Result<Enrolment> {
    let input = normalise(input)?;

    let issued = token::issue();
    let email = input.email.clone();
    let resident = self
      .store()
      .add_resident(input, issued.digest)
      .await
      .map_err(BookingError::store)?
      .ok_or_else(|| already_registered(&email))?;
    info!(resident_id = %resident.resident_id, role = ?resident.role, "resident registered");

    Ok(Enrolment { resident, token: issued.token })
  }

  /// Resolve a presented bearer token to the resident it was issued to.
  pub async fn authenticate(&self, bearer: &str) -> Result<Option<Resident>> {
    let digest = token::digest(bearer);
    self
      .store()
      .resident_by_token(&digest)
      .await
      .map_err(BookingError::store)
  }
}

fn require_admin(requester: &Requester, building_id: Uuid) -> Result<()> {
  if requester.administers(building_id) {
    Ok(())
  } else {
    Err(BookingError::Forbidden(building_id))
  }
}

/// Trim the name, lowercase the email and reject obviously unusable input.
fn normalise(mut input: NewResident) -> Result<NewResident> {
  input.name = input.name.trim().to_owned();
  input.email = input.email.trim().to_lowercase();
  if input.name.is_empty() {
    return Err(BookingError::MalformedRequest("resident name must not be empty".into()));
  }
  if !input.email.contains('@') {
    return Err(BookingError::MalformedRequest(format!(
      "not an email address: {:?}",
      input.email
    )));
  }
  Ok(input)
}

fn already_registered(email: &str) -> BookingError {
  BookingError::MalformedRequest(format!("{email} is already registered"))
}
