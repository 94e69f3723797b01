//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use lumina_api::ApiError;
use lumina_core::BookingError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing or unknown bearer token")]
  Unauthorized,
  #[error(transparent)]
  Booking(#[from] BookingError),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let body = json!({ "reason": "unauthorized", "detail": self.to_string() });
        let mut res = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"lumina\""),
        );
        res
      }
      Error::Booking(e) => ApiError::from(e).into_response(),
    }
  }
}
