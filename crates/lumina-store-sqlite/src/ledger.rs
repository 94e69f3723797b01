//! [`SqliteLedger`] — the [`ReservationLedger`] seen inside one transaction.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use lumina_core::{
  BookingError,
  reservation::{Reservation, ReservationStatus},
  slot::TimeSlot,
  store::ReservationLedger,
};

use crate::encode::{
  RawReservation, encode_date, encode_dt, encode_time, encode_uuid,
};

/// Borrowed view of an open `BEGIN IMMEDIATE` transaction.
pub struct SqliteLedger<'a> {
  conn: &'a Connection,
}

impl<'a> SqliteLedger<'a> {
  pub fn new(conn: &'a Connection) -> Self { Self { conn } }
}

fn db_fault(e: rusqlite::Error) -> BookingError { BookingError::store(e) }

/// The overlap trigger aborts with `SQLITE_CONSTRAINT_TRIGGER`.
fn is_overlap_abort(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER
  )
}

impl ReservationLedger for SqliteLedger<'_> {
  fn get(&mut self, reservation_id: Uuid) -> Result<Option<Reservation>, BookingError> {
    let sql = format!(
      "SELECT {} FROM reservations WHERE reservation_id = ?1",
      RawReservation::COLUMNS
    );
    let raw = self
      .conn
      .query_row(&sql, rusqlite::params![encode_uuid(reservation_id)], RawReservation::from_row)
      .optional()
      .map_err(db_fault)?;
    raw
      .map(RawReservation::into_reservation)
      .transpose()
      .map_err(BookingError::store)
  }

  fn count_active(&mut self, resident_id: Uuid, from: NaiveDate) -> Result<u32, BookingError> {
    self
      .conn
      .query_row(
        "SELECT COUNT(*) FROM reservations
         WHERE resident_id = ?1 AND status = 'confirmed' AND booking_date >= ?2",
        rusqlite::params![encode_uuid(resident_id), encode_date(from)],
        |row| row.get(0),
      )
      .map_err(db_fault)
  }

  fn find_overlapping(
    &mut self,
    amenity_id: Uuid,
    date: NaiveDate,
    slot: &TimeSlot,
  ) -> Result<Vec<Uuid>, BookingError> {
    let mut stmt = self
      .conn
      .prepare_cached(
        "SELECT reservation_id FROM reservations
         WHERE amenity_id = ?1
           AND booking_date = ?2
           AND status = 'confirmed'
           AND start_time < ?4
           AND end_time > ?3",
      )
      .map_err(db_fault)?;
    let ids = stmt
      .query_map(
        rusqlite::params![
          encode_uuid(amenity_id),
          encode_date(date),
          encode_time(slot.start),
          encode_time(slot.end),
        ],
        |row| row.get::<_, String>(0),
      )
      .map_err(db_fault)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(db_fault)?;

    ids
      .iter()
      .map(|s| Uuid::parse_str(s).map_err(BookingError::store))
      .collect()
  }

  fn insert(&mut self, r: &Reservation) -> Result<(), BookingError> {
    self
      .conn
      .execute(
        "INSERT INTO reservations (
           reservation_id, amenity_id, building_id, resident_id,
           booking_date, start_time, end_time, status, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
          encode_uuid(r.reservation_id),
          encode_uuid(r.amenity_id),
          encode_uuid(r.building_id),
          encode_uuid(r.resident_id),
          encode_date(r.date),
          encode_time(r.start_time),
          encode_time(r.end_time),
          r.status.as_str(),
          encode_dt(r.created_at),
        ],
      )
      .map_err(|e| {
        if is_overlap_abort(&e) {
          BookingError::SlotUnavailable
        } else {
          db_fault(e)
        }
      })?;
    Ok(())
  }

  fn transition(
    &mut self,
    reservation_id: Uuid,
    from: ReservationStatus,
    to: ReservationStatus,
  ) -> Result<bool, BookingError> {
    let changed = self
      .conn
      .execute(
        "UPDATE reservations SET status = ?3 WHERE reservation_id = ?1 AND status = ?2",
        rusqlite::params![encode_uuid(reservation_id), from.as_str(), to.as_str()],
      )
      .map_err(db_fault)?;
    Ok(changed == 1)
  }
}
