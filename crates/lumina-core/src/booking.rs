//! Booking Validator & Committer.
//!
//! [`BookingService::submit`] runs the ordered validation chain and commits
//! the reservation; any rejection leaves the store exactly as it was.
//!
//! The chain, in order:
//!
//! 1. field presence and format → `MalformedRequest`
//! 2. `end > start` → `InvalidInterval`
//! 3. resolve amenity and building rules → `InvalidAmenity` /
//!    `ConfigurationUnavailable`
//! 4. duration ≤ `max_duration` → `DurationExceeded`
//! 5. notice ≥ `min_hours_advance` → `InsufficientNotice`
//! 6. slot inside the operating window → `OutsideOperatingHours`
//! 7. active count < `max_active_bookings` → `ActiveLimitReached`
//! 8. no overlapping CONFIRMED reservation → `SlotUnavailable`
//! 9. insert as CONFIRMED
//!
//! Steps 7–9 execute inside one [`BookingStore::atomically`] call, so the
//! overlap read and the insert cannot interleave with another submission.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  BookingError, Result,
  availability::{SlotAvailability, day_grid},
  clock::Clock,
  reservation::{Reservation, ReservationFilter, ReservationRequest, ReservationStatus},
  resident::Requester,
  settings::{self, ResolvedConfiguration},
  slot::TimeSlot,
  store::BookingStore,
};

/// Stateless entry point for every booking operation. Cloning is cheap.
pub struct BookingService<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S> Clone for BookingService<S> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      clock: self.clock.clone(),
    }
  }
}

/// Which reservations a listing should cover.
#[derive(Debug, Clone, Default)]
pub struct ReservationQuery {
  pub amenity_id:     Option<Uuid>,
  pub date:           Option<NaiveDate>,
  pub status:         Option<ReservationStatus>,
  /// Every resident's reservations in the building (admins only) instead of
  /// just the requester's own.
  pub whole_building: bool,
}

impl<S: BookingStore> BookingService<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self { Self { store, clock } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Submit ────────────────────────────────────────────────────────────

  /// Validate `request` on behalf of `requester` and commit it as a new
  /// CONFIRMED reservation.
  pub async fn submit(
    &self,
    requester: &Requester,
    request: &ReservationRequest,
  ) -> Result<Reservation> {
    let outcome = self.validate_and_commit(requester, request).await;
    match &outcome {
      Ok(r) => info!(
        reservation_id = %r.reservation_id,
        amenity_id = %r.amenity_id,
        resident_id = %r.resident_id,
        date = %r.date,
        "reservation confirmed"
      ),
      Err(e) => debug!(
        resident_id = %requester.resident_id,
        reason = e.reason(),
        "reservation rejected: {e}"
      ),
    }
    outcome
  }

  async fn validate_and_commit(
    &self,
    requester: &Requester,
    request: &ReservationRequest,
  ) -> Result<Reservation> {
    let parsed = request.parse()?;

    let slot = TimeSlot::new(parsed.start, parsed.end).ok_or(BookingError::InvalidInterval {
      start: parsed.start,
      end:   parsed.end,
    })?;

    let ResolvedConfiguration { amenity, settings } =
      settings::resolve(self.store.as_ref(), parsed.amenity_id).await?;
    if amenity.building_id != requester.building_id {
      return Err(BookingError::InvalidAmenity(parsed.amenity_id.to_string()));
    }

    let requested_hours = slot.duration_hours();
    if requested_hours > settings.max_duration {
      return Err(BookingError::DurationExceeded {
        requested_hours,
        max_hours: settings.max_duration,
      });
    }

    let now = self.clock.now();
    let notice_hours = (slot.starts_at(parsed.date) - now).num_seconds() as f64 / 3600.0;
    if notice_hours < settings.min_hours_advance {
      return Err(BookingError::InsufficientNotice {
        notice_hours,
        required_hours: settings.min_hours_advance,
      });
    }

    if !slot.within(&amenity.operating_window()) {
      return Err(BookingError::OutsideOperatingHours {
        open:  amenity.open_time,
        close: amenity.close_time,
      });
    }

    let today = now.date();
    let max_active = settings.max_active_bookings;
    let candidate = Reservation {
      reservation_id: Uuid::new_v4(),
      amenity_id:     amenity.amenity_id,
      building_id:    amenity.building_id,
      resident_id:    requester.resident_id,
      date:           parsed.date,
      start_time:     slot.start,
      end_time:       slot.end,
      status:         ReservationStatus::Confirmed,
      created_at:     Utc::now(),
    };

    self
      .store
      .atomically(move |ledger| {
        let active = ledger.count_active(candidate.resident_id, today)?;
        if active >= max_active {
          return Err(BookingError::ActiveLimitReached { active, max: max_active });
        }

        let clashes = ledger.find_overlapping(candidate.amenity_id, candidate.date, &slot)?;
        if !clashes.is_empty() {
          return Err(BookingError::SlotUnavailable);
        }

        ledger.insert(&candidate)?;
        Ok(candidate)
      })
      .await
  }

  // ── Cancel ────────────────────────────────────────────────────────────

  /// Cancel a CONFIRMED reservation owned by the requester (or in a building
  /// the requester administers). Scheduling rules are not re-checked.
  pub async fn cancel(&self, requester: &Requester, reservation_id: Uuid) -> Result<Reservation> {
    let who = *requester;
    let cancelled = self
      .store
      .atomically(move |ledger| {
        let mut reservation = ledger
          .get(reservation_id)?
          .ok_or(BookingError::NotFound(reservation_id))?;
        authorize(&who, &reservation)?;

        let moved = ledger.transition(
          reservation_id,
          ReservationStatus::Confirmed,
          ReservationStatus::Cancelled,
        )?;
        if !moved {
          return Err(BookingError::NotFound(reservation_id));
        }
        reservation.status = ReservationStatus::Cancelled;
        Ok(reservation)
      })
      .await?;

    info!(
      reservation_id = %cancelled.reservation_id,
      cancelled_by = %requester.resident_id,
      "reservation cancelled"
    );
    Ok(cancelled)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn reservation(&self, requester: &Requester, reservation_id: Uuid) -> Result<Reservation> {
    let reservation = self
      .store
      .get_reservation(reservation_id)
      .await
      .map_err(BookingError::store)?
      .ok_or(BookingError::NotFound(reservation_id))?;
    authorize(requester, &reservation)?;
    Ok(reservation)
  }

  pub async fn reservations(
    &self,
    requester: &Requester,
    query: ReservationQuery,
  ) -> Result<Vec<Reservation>> {
    if query.whole_building && !requester.is_admin() {
      return Err(BookingError::Forbidden(requester.building_id));
    }
    let filter = ReservationFilter {
      building_id: Some(requester.building_id),
      resident_id: (!query.whole_building).then_some(requester.resident_id),
      amenity_id:  query.amenity_id,
      date:        query.date,
      status:      query.status,
    };
    self.store.list_reservations(&filter).await.map_err(BookingError::store)
  }

  /// Hourly free/booked grid for one amenity on one day.
  pub async fn availability(
    &self,
    requester: &Requester,
    amenity_id: Uuid,
    date: NaiveDate,
  ) -> Result<Vec<SlotAvailability>> {
    let amenity = self.amenity(requester, amenity_id).await?;
    let filter = ReservationFilter {
      amenity_id: Some(amenity_id),
      date: Some(date),
      status: Some(ReservationStatus::Confirmed),
      ..ReservationFilter::default()
    };
    let booked = self.store.list_reservations(&filter).await.map_err(BookingError::store)?;
    Ok(day_grid(&amenity, &booked))
  }
}

/// Owners may act on their own reservations; admins on any in their building.
fn authorize(requester: &Requester, reservation: &Reservation) -> Result<()> {
  if reservation.resident_id == requester.resident_id
    || requester.administers(reservation.building_id)
  {
    Ok(())
  } else {
    Err(BookingError::Forbidden(reservation.reservation_id))
  }
}

#[cfg(test)]
mod tests {
  use std::io;

  use chrono::NaiveDate;

  use super::*;
  use crate::{
    amenity::{Amenity, Building, NewAmenity},
    clock::FixedClock,
    resident::{NewResident, Resident, Role},
    settings::SettingEntry,
    slot::parse_time,
    store::ReservationLedger,
  };

  /// Knows one amenity and fails every settings lookup. Anything else the
  /// validator should never reach panics.
  struct BrokenSettings {
    amenity: Amenity,
  }

  impl BookingStore for BrokenSettings {
    type Error = io::Error;
    async fn add_building_with_admin(&self, _: String, _: NewResident, _: String) -> Result<Option<(Building, Resident)>, Self::Error> { unimplemented!() }
    async fn get_building(&self, _: Uuid) -> Result<Option<Building>, Self::Error> { unimplemented!() }
    async fn add_amenity(&self, _: NewAmenity) -> Result<Amenity, Self::Error> { unimplemented!() }
    async fn get_amenity(&self, id: Uuid) -> Result<Option<Amenity>, Self::Error> {
      Ok((id == self.amenity.amenity_id).then(|| self.amenity.clone()))
    }
    async fn list_amenities(&self, _: Uuid) -> Result<Vec<Amenity>, Self::Error> { unimplemented!() }
    async fn building_settings(&self, _: Uuid) -> Result<Vec<SettingEntry>, Self::Error> {
      Err(io::Error::other("settings table locked"))
    }
    async fn put_setting(&self, _: SettingEntry) -> Result<(), Self::Error> { unimplemented!() }
    async fn add_resident(&self, _: NewResident, _: String) -> Result<Option<Resident>, Self::Error> { unimplemented!() }
    async fn resident_by_token<'a>(&'a self, _: &'a str) -> Result<Option<Resident>, Self::Error> { unimplemented!() }
    async fn list_residents(&self, _: Uuid) -> Result<Vec<Resident>, Self::Error> { unimplemented!() }
    async fn get_reservation(&self, _: Uuid) -> Result<Option<Reservation>, Self::Error> { unimplemented!() }
    async fn list_reservations<'a>(&'a self, _: &'a ReservationFilter) -> Result<Vec<Reservation>, Self::Error> { unimplemented!() }
    async fn atomically<T, F>(&self, _: F) -> Result<T, BookingError>
    where
      T: Send + 'static,
      F: FnOnce(&mut dyn ReservationLedger) -> Result<T, BookingError> + Send + 'static,
    {
      unimplemented!()
    }
  }

  fn service() -> (BookingService<BrokenSettings>, Requester, Uuid) {
    let building_id = Uuid::new_v4();
    let amenity = Amenity {
      amenity_id: Uuid::new_v4(),
      building_id,
      name: "Sauna".into(),
      description: String::new(),
      capacity: 4,
      open_time: parse_time("08:00").unwrap(),
      close_time: parse_time("22:00").unwrap(),
    };
    let amenity_id = amenity.amenity_id;
    let now = NaiveDate::from_ymd_opt(2026, 10, 17)
      .unwrap()
      .and_hms_opt(8, 0, 0)
      .unwrap();
    let requester = Requester {
      resident_id: Uuid::new_v4(),
      building_id,
      role: Role::Resident,
    };
    let svc = BookingService::new(Arc::new(BrokenSettings { amenity }), Arc::new(FixedClock(now)));
    (svc, requester, amenity_id)
  }

  #[tokio::test]
  async fn settings_fault_is_configuration_unavailable() {
    let (svc, who, amenity_id) = service();
    let req = ReservationRequest::new(amenity_id, "2026-10-18", "10:00", "11:00");
    let err = svc.submit(&who, &req).await.unwrap_err();
    assert!(matches!(err, BookingError::ConfigurationUnavailable(_)), "{err:?}");
  }

  #[tokio::test]
  async fn inverted_interval_never_reaches_the_store() {
    let (svc, who, _) = service();
    // An amenity the store has never heard of: resolving it would yield
    // InvalidAmenity, so this proves the interval check comes first.
    let req = ReservationRequest::new(Uuid::new_v4(), "2026-10-18", "11:00", "10:00");
    let err = svc.submit(&who, &req).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidInterval { .. }));
  }
}
