//! The `BookingStore` trait and the transactional `ReservationLedger`.
//!
//! The trait is implemented by storage backends (e.g. `lumina-store-sqlite`).
//! Higher layers (`lumina-api`, `lumina-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  BookingError,
  amenity::{Amenity, Building, NewAmenity},
  reservation::{Reservation, ReservationFilter, ReservationStatus},
  resident::{NewResident, Resident},
  settings::SettingEntry,
  slot::TimeSlot,
};

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Reservation reads and writes available inside one atomic unit of work.
///
/// Everything done through a single ledger is committed together or not at
/// all, and no other ledger observes or interleaves with it. Backend faults
/// surface as [`BookingError::StoreUnavailable`].
pub trait ReservationLedger {
  fn get(&mut self, reservation_id: Uuid) -> Result<Option<Reservation>, BookingError>;

  /// CONFIRMED reservations held by `resident_id` dated `from` or later.
  fn count_active(&mut self, resident_id: Uuid, from: NaiveDate) -> Result<u32, BookingError>;

  /// Ids of CONFIRMED reservations on `amenity_id`/`date` overlapping `slot`.
  fn find_overlapping(
    &mut self,
    amenity_id: Uuid,
    date: NaiveDate,
    slot: &TimeSlot,
  ) -> Result<Vec<Uuid>, BookingError>;

  /// Insert a new reservation. Backends that enforce overlap at commit time
  /// report a violation as [`BookingError::SlotUnavailable`].
  fn insert(&mut self, reservation: &Reservation) -> Result<(), BookingError>;

  /// Move `reservation_id` from `from` to `to`. Returns `false` (and changes
  /// nothing) when the current status is not `from`.
  fn transition(
    &mut self,
    reservation_id: Uuid,
    from: ReservationStatus,
    to: ReservationStatus,
  ) -> Result<bool, BookingError>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Lumina store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BookingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Buildings ─────────────────────────────────────────────────────────

  /// Create a building and its first resident in one step. The building id
  /// in `admin` is replaced by the new building's. Returns `None`, creating
  /// nothing, when the admin's email is already registered.
  fn add_building_with_admin(
    &self,
    name: String,
    admin: NewResident,
    token_digest: String,
  ) -> impl Future<Output = Result<Option<(Building, Resident)>, Self::Error>> + Send + '_;

  fn get_building(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Building>, Self::Error>> + Send + '_;

  // ── Amenities ─────────────────────────────────────────────────────────

  fn add_amenity(
    &self,
    input: NewAmenity,
  ) -> impl Future<Output = Result<Amenity, Self::Error>> + Send + '_;

  /// Retrieve an amenity by UUID. Returns `None` if not found.
  fn get_amenity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Amenity>, Self::Error>> + Send + '_;

  fn list_amenities(
    &self,
    building_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Amenity>, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  /// All stored key/value entries for a building (possibly none).
  fn building_settings(
    &self,
    building_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SettingEntry>, Self::Error>> + Send + '_;

  /// Insert or replace one setting.
  fn put_setting(
    &self,
    entry: SettingEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Residents ─────────────────────────────────────────────────────────

  /// Persist a resident together with the digest of their bearer token.
  /// Emails are unique across every building; returns `None` when the email
  /// is already taken.
  fn add_resident(
    &self,
    input: NewResident,
    token_digest: String,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + '_;

  fn resident_by_token<'a>(
    &'a self,
    token_digest: &'a str,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + 'a;

  fn list_residents(
    &self,
    building_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Resident>, Self::Error>> + Send + '_;

  // ── Reservations ──────────────────────────────────────────────────────

  fn get_reservation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Reservation>, Self::Error>> + Send + '_;

  /// Reservations matching every set field of `filter`, ordered by date and
  /// start time.
  fn list_reservations<'a>(
    &'a self,
    filter: &'a ReservationFilter,
  ) -> impl Future<Output = Result<Vec<Reservation>, Self::Error>> + Send + 'a;

  /// Run `work` against a [`ReservationLedger`] as one atomic unit.
  ///
  /// If `work` returns `Ok` its writes are committed; if it returns `Err`
  /// nothing it did is kept. Concurrent calls never interleave their reads
  /// and writes.
  fn atomically<T, F>(&self, work: F) -> impl Future<Output = Result<T, BookingError>> + Send + '_
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn ReservationLedger) -> Result<T, BookingError> + Send + 'static;
}
