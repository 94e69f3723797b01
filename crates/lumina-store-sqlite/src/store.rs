//! [`SqliteStore`] — the SQLite implementation of [`BookingStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use lumina_core::{
  BookingError,
  amenity::{Amenity, Building, NewAmenity},
  reservation::{Reservation, ReservationFilter},
  resident::{NewResident, Resident},
  settings::SettingEntry,
  store::{BookingStore, ReservationLedger},
};

use crate::{
  Result,
  encode::{
    RawAmenity, RawBuilding, RawReservation, RawResident, RawSetting, encode_date, encode_dt,
    encode_role, encode_time, encode_uuid,
  },
  ledger::SqliteLedger,
  schema::SCHEMA,
};

/// How long a writer waits for another connection's transaction to finish
/// before giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lumina store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BookingStore impl ───────────────────────────────────────────────────────

impl BookingStore for SqliteStore {
  type Error = crate::Error;

  // ── Buildings ─────────────────────────────────────────────────────────────

  async fn add_building_with_admin(
    &self,
    name: String,
    admin: NewResident,
    token_digest: String,
  ) -> Result<Option<(Building, Resident)>> {
    let building = Building {
      building_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };
    let resident = new_resident(NewResident {
      building_id: building.building_id,
      ..admin
    });

    let (b_row, r_row) = (building.clone(), resident.clone());
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        insert_building(&tx, &b_row)?;
        if !insert_resident(&tx, &r_row, &token_digest)? {
          // Dropping `tx` rolls the building back too.
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some((building, resident)))
  }

  async fn get_building(&self, id: Uuid) -> Result<Option<Building>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBuilding> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM buildings WHERE building_id = ?1", RawBuilding::COLUMNS);
        Ok(conn.query_row(&sql, rusqlite::params![id_str], RawBuilding::from_row).optional()?)
      })
      .await?;

    raw.map(RawBuilding::into_building).transpose()
  }

  // ── Amenities ─────────────────────────────────────────────────────────────

  async fn add_amenity(&self, input: NewAmenity) -> Result<Amenity> {
    let amenity = Amenity {
      amenity_id:  Uuid::new_v4(),
      building_id: input.building_id,
      name:        input.name,
      description: input.description,
      capacity:    input.capacity,
      open_time:   input.open_time,
      close_time:  input.close_time,
    };

    let id_str       = encode_uuid(amenity.amenity_id);
    let building_str = encode_uuid(amenity.building_id);
    let name         = amenity.name.clone();
    let description  = amenity.description.clone();
    let capacity     = amenity.capacity;
    let open_str     = encode_time(amenity.open_time);
    let close_str    = encode_time(amenity.close_time);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO amenities (
             amenity_id, building_id, name, description, capacity, open_time, close_time
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            building_str,
            name,
            description,
            capacity,
            open_str,
            close_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(amenity)
  }

  async fn get_amenity(&self, id: Uuid) -> Result<Option<Amenity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAmenity> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM amenities WHERE amenity_id = ?1", RawAmenity::COLUMNS);
        Ok(conn.query_row(&sql, rusqlite::params![id_str], RawAmenity::from_row).optional()?)
      })
      .await?;

    raw.map(RawAmenity::into_amenity).transpose()
  }

  async fn list_amenities(&self, building_id: Uuid) -> Result<Vec<Amenity>> {
    let building_str = encode_uuid(building_id);

    let raws: Vec<RawAmenity> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM amenities WHERE building_id = ?1 ORDER BY name",
          RawAmenity::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![building_str], RawAmenity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAmenity::into_amenity).collect()
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn building_settings(&self, building_id: Uuid) -> Result<Vec<SettingEntry>> {
    let building_str = encode_uuid(building_id);

    let raws: Vec<RawSetting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT building_id, key, value FROM building_settings WHERE building_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![building_str], |row| {
            Ok(RawSetting {
              building_id: row.get(0)?,
              key:         row.get(1)?,
              value:       row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSetting::into_entry).collect()
  }

  async fn put_setting(&self, entry: SettingEntry) -> Result<()> {
    let building_str = encode_uuid(entry.building_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO building_settings (building_id, key, value) VALUES (?1, ?2, ?3)
           ON CONFLICT (building_id, key) DO UPDATE SET value = excluded.value",
          rusqlite::params![building_str, entry.key, entry.value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Residents ─────────────────────────────────────────────────────────────

  async fn add_resident(
    &self,
    input: NewResident,
    token_digest: String,
  ) -> Result<Option<Resident>> {
    let resident = new_resident(input);

    let row = resident.clone();
    let inserted = self
      .conn
      .call(move |conn| Ok(insert_resident(conn, &row, &token_digest)?))
      .await?;

    Ok(inserted.then_some(resident))
  }

  async fn resident_by_token<'a>(&'a self, token_digest: &'a str) -> Result<Option<Resident>> {
    let digest = token_digest.to_owned();

    let raw: Option<RawResident> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM residents WHERE token_digest = ?1", RawResident::COLUMNS);
        Ok(conn.query_row(&sql, rusqlite::params![digest], RawResident::from_row).optional()?)
      })
      .await?;

    raw.map(RawResident::into_resident).transpose()
  }

  async fn list_residents(&self, building_id: Uuid) -> Result<Vec<Resident>> {
    let building_str = encode_uuid(building_id);

    let raws: Vec<RawResident> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM residents WHERE building_id = ?1 ORDER BY name",
          RawResident::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![building_str], RawResident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResident::into_resident).collect()
  }

  // ── Reservations ──────────────────────────────────────────────────────────

  async fn get_reservation(&self, id: Uuid) -> Result<Option<Reservation>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReservation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM reservations WHERE reservation_id = ?1",
          RawReservation::COLUMNS
        );
        Ok(conn.query_row(&sql, rusqlite::params![id_str], RawReservation::from_row).optional()?)
      })
      .await?;

    raw.map(RawReservation::into_reservation).transpose()
  }

  async fn list_reservations<'a>(
    &'a self,
    filter: &'a ReservationFilter,
  ) -> Result<Vec<Reservation>> {
    // Build WHERE clause dynamically; every bound value is text.
    let mut conds: Vec<&'static str> = vec![];
    let mut values: Vec<String> = vec![];
    if let Some(id) = filter.building_id {
      conds.push("building_id = ?");
      values.push(encode_uuid(id));
    }
    if let Some(id) = filter.resident_id {
      conds.push("resident_id = ?");
      values.push(encode_uuid(id));
    }
    if let Some(id) = filter.amenity_id {
      conds.push("amenity_id = ?");
      values.push(encode_uuid(id));
    }
    if let Some(date) = filter.date {
      conds.push("booking_date = ?");
      values.push(encode_date(date));
    }
    if let Some(status) = filter.status {
      conds.push("status = ?");
      values.push(status.as_str().to_owned());
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT {} FROM reservations {where_clause} ORDER BY booking_date, start_time",
      RawReservation::COLUMNS
    );

    let raws: Vec<RawReservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values.iter()), RawReservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReservation::into_reservation).collect()
  }

  // ── Atomic unit of work ───────────────────────────────────────────────────

  async fn atomically<T, F>(&self, work: F) -> Result<T, BookingError>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn ReservationLedger) -> Result<T, BookingError> + Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front, so the reads made by
        // `work` cannot go stale before its writes land.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = {
          let mut ledger = SqliteLedger::new(&tx);
          work(&mut ledger)
        };
        match outcome {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping `tx` rolls back.
          Err(e) => Ok(Err(e)),
        }
      })
      .await
      .map_err(BookingError::store)?;
    outcome
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn new_resident(input: NewResident) -> Resident {
  Resident {
    resident_id: Uuid::new_v4(),
    building_id: input.building_id,
    name:        input.name,
    email:       input.email,
    unit:        input.unit,
    role:        input.role,
    created_at:  Utc::now(),
  }
}

fn insert_building(conn: &rusqlite::Connection, b: &Building) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO buildings (building_id, name, created_at) VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(b.building_id), b.name, encode_dt(b.created_at)],
  )?;
  Ok(())
}

/// Returns `false`, writing nothing, when the email is already registered.
fn insert_resident(
  conn: &rusqlite::Connection,
  r: &Resident,
  token_digest: &str,
) -> rusqlite::Result<bool> {
  let inserted = conn.execute(
    "INSERT INTO residents (
       resident_id, building_id, name, email, unit, role, token_digest, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
     ON CONFLICT (email) DO NOTHING",
    rusqlite::params![
      encode_uuid(r.resident_id),
      encode_uuid(r.building_id),
      r.name,
      r.email,
      r.unit,
      encode_role(r.role),
      token_digest,
      encode_dt(r.created_at)
    ],
  )?;
  Ok(inserted == 1)
}
