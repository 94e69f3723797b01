//! Handlers for `/settings`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/settings` | Effective rules for the requester's building |
//! | `PUT`  | `/settings` | Admin only; partial body, e.g. `{"max_duration":2}` |

use axum::{
  Extension, Json,
  extract::{State, rejection::JsonRejection},
};
use lumina_core::{
  BookingService, admin::SettingsPatch, resident::Requester, settings::BookingSettings,
  store::BookingStore,
};

use crate::error::ApiError;

/// `GET /settings`
pub async fn get<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
) -> Result<Json<BookingSettings>, ApiError> {
  Ok(Json(bookings.settings(&requester).await?))
}

/// `PUT /settings`
pub async fn update<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  body: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<BookingSettings>, ApiError> {
  let Json(patch) = body?;
  Ok(Json(bookings.update_settings(&requester, patch).await?))
}
