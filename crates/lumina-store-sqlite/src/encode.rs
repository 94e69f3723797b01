//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates `YYYY-MM-DD`, clock times `HH:MM`
//! and UUIDs hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lumina_core::{
  amenity::{Amenity, Building},
  reservation::{Reservation, ReservationStatus},
  resident::{Resident, Role},
  settings::SettingEntry,
  slot::{DATE_FORMAT, TIME_FORMAT, parse_date, parse_time},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  parse_date(s).ok_or_else(|| Error::DateParse(format!("bad date: {s:?}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  parse_time(s).ok_or_else(|| Error::DateParse(format!("bad time: {s:?}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<ReservationStatus> {
  ReservationStatus::parse(s).ok_or_else(|| Error::UnknownValue {
    column: "status",
    value:  s.to_owned(),
  })
}

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Resident => "resident",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "resident" => Ok(Role::Resident),
    "admin" => Ok(Role::Admin),
    other => Err(Error::UnknownValue {
      column: "role",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `buildings` row.
pub struct RawBuilding {
  pub building_id: String,
  pub name:        String,
  pub created_at:  String,
}

impl RawBuilding {
  pub const COLUMNS: &'static str = "building_id, name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      building_id: row.get(0)?,
      name:        row.get(1)?,
      created_at:  row.get(2)?,
    })
  }

  pub fn into_building(self) -> Result<Building> {
    Ok(Building {
      building_id: decode_uuid(&self.building_id)?,
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAmenity {
  pub amenity_id:  String,
  pub building_id: String,
  pub name:        String,
  pub description: String,
  pub capacity:    u32,
  pub open_time:   String,
  pub close_time:  String,
}

impl RawAmenity {
  pub const COLUMNS: &'static str =
    "amenity_id, building_id, name, description, capacity, open_time, close_time";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      amenity_id:  row.get(0)?,
      building_id: row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      capacity:    row.get(4)?,
      open_time:   row.get(5)?,
      close_time:  row.get(6)?,
    })
  }

  pub fn into_amenity(self) -> Result<Amenity> {
    Ok(Amenity {
      amenity_id:  decode_uuid(&self.amenity_id)?,
      building_id: decode_uuid(&self.building_id)?,
      name:        self.name,
      description: self.description,
      capacity:    self.capacity,
      open_time:   decode_time(&self.open_time)?,
      close_time:  decode_time(&self.close_time)?,
    })
  }
}

pub struct RawSetting {
  pub building_id: String,
  pub key:         String,
  pub value:       String,
}

impl RawSetting {
  pub fn into_entry(self) -> Result<SettingEntry> {
    Ok(SettingEntry {
      building_id: decode_uuid(&self.building_id)?,
      key:         self.key,
      value:       self.value,
    })
  }
}

pub struct RawResident {
  pub resident_id: String,
  pub building_id: String,
  pub name:        String,
  pub email:       String,
  pub unit:        Option<String>,
  pub role:        String,
  pub created_at:  String,
}

impl RawResident {
  pub const COLUMNS: &'static str =
    "resident_id, building_id, name, email, unit, role, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resident_id: row.get(0)?,
      building_id: row.get(1)?,
      name:        row.get(2)?,
      email:       row.get(3)?,
      unit:        row.get(4)?,
      role:        row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_resident(self) -> Result<Resident> {
    Ok(Resident {
      resident_id: decode_uuid(&self.resident_id)?,
      building_id: decode_uuid(&self.building_id)?,
      name:        self.name,
      email:       self.email,
      unit:        self.unit,
      role:        decode_role(&self.role)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reservations` row.
pub struct RawReservation {
  pub reservation_id: String,
  pub amenity_id:     String,
  pub building_id:    String,
  pub resident_id:    String,
  pub booking_date:   String,
  pub start_time:     String,
  pub end_time:       String,
  pub status:         String,
  pub created_at:     String,
}

impl RawReservation {
  pub const COLUMNS: &'static str = "reservation_id, amenity_id, building_id, resident_id, \
                                     booking_date, start_time, end_time, status, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reservation_id: row.get(0)?,
      amenity_id:     row.get(1)?,
      building_id:    row.get(2)?,
      resident_id:    row.get(3)?,
      booking_date:   row.get(4)?,
      start_time:     row.get(5)?,
      end_time:       row.get(6)?,
      status:         row.get(7)?,
      created_at:     row.get(8)?,
    })
  }

  pub fn into_reservation(self) -> Result<Reservation> {
    Ok(Reservation {
      reservation_id: decode_uuid(&self.reservation_id)?,
      amenity_id:     decode_uuid(&self.amenity_id)?,
      building_id:    decode_uuid(&self.building_id)?,
      resident_id:    decode_uuid(&self.resident_id)?,
      date:           decode_date(&self.booking_date)?,
      start_time:     decode_time(&self.start_time)?,
      end_time:       decode_time(&self.end_time)?,
      status:         decode_status(&self.status)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
