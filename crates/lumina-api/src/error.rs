//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure renders as
//! `{"reason": "<snake_case>", "detail": "<message>", ...numeric context}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use lumina_core::BookingError;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Booking(#[from] BookingError),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Booking(BookingError::MalformedRequest(rejection.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::Booking(BookingError::MalformedRequest(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Booking(BookingError::MalformedRequest(rejection.body_text()))
  }
}

pub fn status_for(err: &BookingError) -> StatusCode {
  use BookingError::*;
  match err {
    MalformedRequest(_) => StatusCode::BAD_REQUEST,
    InvalidInterval { .. }
    | OutsideOperatingHours { .. }
    | DurationExceeded { .. }
    | InsufficientNotice { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    ActiveLimitReached { .. } | SlotUnavailable => StatusCode::CONFLICT,
    InvalidAmenity(_) | NotFound(_) => StatusCode::NOT_FOUND,
    Forbidden(_) => StatusCode::FORBIDDEN,
    ConfigurationUnavailable(_) | StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
  }
}

/// The numeric values behind a threshold rejection, if any.
fn context(err: &BookingError) -> Map<String, Value> {
  let value = match err {
    BookingError::DurationExceeded { requested_hours, max_hours } => {
      json!({ "requested_hours": requested_hours, "max_hours": max_hours })
    }
    BookingError::InsufficientNotice { notice_hours, required_hours } => {
      json!({ "notice_hours": notice_hours, "required_hours": required_hours })
    }
    BookingError::ActiveLimitReached { active, max } => {
      json!({ "active": active, "max": max })
    }
    BookingError::OutsideOperatingHours { open, close } => json!({
      "open_time": open.format("%H:%M").to_string(),
      "close_time": close.format("%H:%M").to_string(),
    }),
    _ => return Map::new(),
  };
  match value {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let ApiError::Booking(err) = self;
    let status = status_for(&err);
    if status.is_server_error() {
      tracing::warn!(reason = err.reason(), "request failed: {err}");
    }

    let mut body = context(&err);
    body.insert("reason".into(), err.reason().into());
    body.insert("detail".into(), err.to_string().into());
    (status, Json(Value::Object(body))).into_response()
  }
}
