//! Handlers for `/residents` and `/me`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/residents` | Admin only |
//! | `POST` | `/residents` | Admin only; returns 201 + resident + bearer token |
//! | `GET`  | `/me` | The authenticated requester |

use axum::{
  Extension, Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use lumina_core::{
  BookingService,
  resident::{NewResident, Requester, Resident, Role},
  store::BookingStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /residents`
pub async fn list<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
) -> Result<Json<Vec<Resident>>, ApiError> {
  Ok(Json(bookings.residents(&requester).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  String,
  pub email: String,
  pub unit:  Option<String>,
  #[serde(default = "default_role")]
  pub role:  Role,
}

fn default_role() -> Role { Role::Resident }

/// The token is shown exactly once; only its digest is stored.
#[derive(Debug, Serialize)]
pub struct Created {
  pub resident: Resident,
  pub token:    String,
}

/// `POST /residents`
pub async fn create<S: BookingStore>(
  State(bookings): State<BookingService<S>>,
  Extension(requester): Extension<Requester>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let input = NewResident {
    building_id: requester.building_id,
    name:        body.name,
    email:       body.email,
    unit:        body.unit,
    role:        body.role,
  };
  let enrolment = bookings.enrol(&requester, input).await?;
  Ok((StatusCode::CREATED, Json(Created {
    resident: enrolment.resident,
    token:    enrolment.token,
  })))
}

/// `GET /me`
pub async fn me(Extension(requester): Extension<Requester>) -> Json<Requester> { Json(requester) }
