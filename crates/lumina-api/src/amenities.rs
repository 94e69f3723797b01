//! Handlers for `/amenities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/amenities` | Amenities of the requester's building |
//! | `POST` | `/amenities` | Admin only; body: [`CreateBody`] |
//! | `GET`  | `/amenities/{id}` | 404 if unknown or in another building |
//! | `GET`  | `/amenities/{id}/availability` | `?date=YYYY-MM-DD`; hourly slots |

use axum::{
  Extension, Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use lumina_core::{
  BookingService,
  amenity::{Amenity, NewAmenity},
  availability::SlotAvailability,
  resident::Requester,
  slot::hhmm,
  store::BookingStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /amenities`
pub async fn list<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<Amenity>>, ApiError> {
  Ok(Json(bookings.amenities(&requester).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Body for `POST /amenities`. The building is always the admin's own.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub capacity:    u32,
  #[serde(with = "hhmm")]
  pub open_time:   NaiveTime,
  #[serde(with = "hhmm")]
  pub close_time:  NaiveTime,
}

/// `POST /amenities`
pub async fn create<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let input = NewAmenity {
    building_id: requester.building_id,
    name:        body.name,
    description: body.description,
    capacity:    body.capacity,
    open_time:   body.open_time,
    close_time:  body.close_time,
  };
  let amenity = bookings.create_amenity(&requester, input).await?;
  Ok((StatusCode::CREATED, Json(amenity)))
}

/// `GET /amenities/{id}`
pub async fn get_one<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Amenity>, ApiError> {
  let Path(id) = id?;
  Ok(Json(bookings.amenity(&requester, id).await?))
}

// ─── Availability ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
  pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DayAvailability {
  pub amenity_id: Uuid,
  pub date:       NaiveDate,
  pub slots:      Vec<SlotAvailability>,
}

/// `GET /amenities/{id}/availability?date=YYYY-MM-DD`
pub async fn availability<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<AvailabilityParams>, QueryRejection>,
) -> Result<Json<DayAvailability>, ApiError> {
  let (Path(id), Query(params)) = (id?, params?);
  let slots = bookings.availability(&requester, id, params.date).await?;
  Ok(Json(DayAvailability {
    amenity_id: id,
    date: params.date,
    slots,
  }))
}
