//! Handlers for `/reservations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reservations` | Body: [`ReservationRequest`]; returns 201 + reservation |
//! | `GET`  | `/reservations` | Optional `amenity_id`, `date`, `status`, `scope=building` |
//! | `GET`  | `/reservations/{id}` | Owner or building admin |
//! | `POST` | `/reservations/{id}/cancel` | Returns the cancelled reservation |
//!
//! The requester always comes from the authenticated identity; any
//! `resident_id` in a request body is ignored.

use axum::{
  Extension, Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use lumina_core::{
  BookingService,
  booking::ReservationQuery,
  reservation::{Reservation, ReservationRequest, ReservationStatus},
  resident::Requester,
  store::BookingStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /reservations`
pub async fn submit<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  body: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(request) = body?;
  let reservation = bookings.submit(&requester, &request).await?;
  Ok((StatusCode::CREATED, Json(reservation)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  #[default]
  Mine,
  /// Every reservation in the building; admins only.
  Building,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub amenity_id: Option<Uuid>,
  pub date:       Option<NaiveDate>,
  pub status:     Option<ReservationStatus>,
  #[serde(default)]
  pub scope:      Scope,
}

/// `GET /reservations[?amenity_id=...][&date=...][&status=...][&scope=building]`
pub async fn list<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
  let Query(params) = params?;
  let query = ReservationQuery {
    amenity_id:     params.amenity_id,
    date:           params.date,
    status:         params.status,
    whole_building: params.scope == Scope::Building,
  };
  Ok(Json(bookings.reservations(&requester, query).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /reservations/{id}`
pub async fn get_one<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Reservation>, ApiError> {
  let Path(id) = id?;
  Ok(Json(bookings.reservation(&requester, id).await?))
}

// ─── Cancel ───────────────────────────────────────────────────────────────────

/// `POST /reservations/{id}/cancel`
pub async fn cancel<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Reservation>, ApiError> {
  let Path(id) = id?;
  Ok(Json(bookings.cancel(&requester, id).await?))
}
