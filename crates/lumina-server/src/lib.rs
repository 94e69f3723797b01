//! HTTP server assembly for Lumina.
//!
//! Wraps the [`lumina_api`] router with bearer-token authentication, request
//! tracing and an unauthenticated health check.

pub mod auth;
pub mod error;

pub use error::Error;

use std::path::PathBuf;

use axum::{Json, Router, middleware, routing::get};
use lumina_core::{BookingService, store::BookingStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LUMINA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the middleware.
pub struct AppState<S> {
  pub bookings: BookingService<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      bookings: self.bookings.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/health` plus the authenticated
/// API under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BookingStore + 'static,
{
  let api = lumina_api::api_router(state.bookings.clone())
    .layer(middleware::from_fn_with_state(state, auth::require_bearer::<S>));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use lumina_core::clock::FixedClock;
  use lumina_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  struct Harness {
    state:       AppState<SqliteStore>,
    admin_token: String,
  }

  async fn harness() -> Harness {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = NaiveDate::from_ymd_opt(2026, 10, 17)
      .unwrap()
      .and_hms_opt(8, 0, 0)
      .unwrap();
    let bookings = BookingService::new(Arc::new(store), Arc::new(FixedClock(now)));
    let (_, admin) = bookings
      .bootstrap("Lumina Tower", "Ada Admin", "ada@example.com")
      .await
      .unwrap();

    Harness {
      state:       AppState { bookings },
      admin_token: admin.token,
    }
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  /// Create the pool and a resident; returns `(amenity_id, resident_token)`.
  async fn seed(h: &Harness) -> (String, String) {
    let admin = Some(h.admin_token.as_str());
    let (status, amenity) = send(
      &h.state,
      "POST",
      "/api/amenities",
      admin,
      Some(json!({
        "name": "Rooftop Pool",
        "capacity": 12,
        "open_time": "08:00",
        "close_time": "22:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{amenity}");

    let (status, created) = send(
      &h.state,
      "POST",
      "/api/residents",
      admin,
      Some(json!({ "name": "Alice", "email": "alice@example.com", "unit": "5-B" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    (
      amenity["amenity_id"].as_str().unwrap().to_owned(),
      created["token"].as_str().unwrap().to_owned(),
    )
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_needs_no_credentials() {
    let h = harness().await;
    let (status, body) = send(&h.state, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  #[tokio::test]
  async fn api_requires_bearer_token() {
    let h = harness().await;
    let req = Request::builder().uri("/api/me").body(Body::empty()).unwrap();
    let resp = router(h.state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Bearer"));

    let (status, body) = send(&h.state, "GET", "/api/me", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "unauthorized");
  }

  #[tokio::test]
  async fn me_reports_the_token_owner() {
    let h = harness().await;
    let (status, me) = send(&h.state, "GET", "/api/me", Some(h.admin_token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "admin");
  }

  // ── Booking flow ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn booking_flow_over_http() {
    let h = harness().await;
    let (amenity_id, alice) = seed(&h).await;
    let alice = Some(alice.as_str());

    let (status, me) = send(&h.state, "GET", "/api/me", alice, None).await;
    assert_eq!(status, StatusCode::OK);

    // A smuggled resident id is ignored.
    let (status, booked) = send(
      &h.state,
      "POST",
      "/api/reservations",
      alice,
      Some(json!({
        "amenity_id": amenity_id,
        "date": "2026-10-18",
        "start_time": "10:00",
        "end_time": "12:00",
        "resident_id": Uuid::new_v4(),
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booked}");
    assert_eq!(booked["resident_id"], me["resident_id"]);
    assert_eq!(booked["status"], "confirmed");
    assert_eq!(booked["start_time"], "10:00");

    let (status, clash) = send(
      &h.state,
      "POST",
      "/api/reservations",
      Some(h.admin_token.as_str()),
      Some(json!({
        "amenity_id": amenity_id,
        "date": "2026-10-18",
        "start_time": "11:00",
        "end_time": "13:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(clash["reason"], "slot_unavailable");

    let (status, long) = send(
      &h.state,
      "POST",
      "/api/reservations",
      alice,
      Some(json!({
        "amenity_id": amenity_id,
        "date": "2026-10-18",
        "start_time": "13:00",
        "end_time": "19:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(long["reason"], "duration_exceeded");
    assert_eq!(long["detail"], "requested 6.0h, max 4h");
    assert_eq!(long["requested_hours"], 6.0);
    assert_eq!(long["max_hours"], 4.0);

    let uri = format!("/api/amenities/{amenity_id}/availability?date=2026-10-18");
    let (status, grid) = send(&h.state, "GET", &uri, alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["slots"][2]["start"], "10:00");
    assert_eq!(grid["slots"][2]["available"], false);

    let id = booked["reservation_id"].as_str().unwrap();
    let (status, cancelled) =
      send(&h.state, "POST", &format!("/api/reservations/{id}/cancel"), alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, mine) = send(&h.state, "GET", "/api/reservations?status=confirmed", alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn malformed_body_is_a_structured_400() {
    let h = harness().await;
    let (amenity_id, alice) = seed(&h).await;

    let (status, body) = send(
      &h.state,
      "POST",
      "/api/reservations",
      Some(alice.as_str()),
      Some(json!({ "amenity_id": amenity_id, "date": "2026-10-18" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "malformed_request");

    let (status, body) = send(
      &h.state,
      "POST",
      "/api/reservations",
      Some(alice.as_str()),
      Some(json!({
        "amenity_id": amenity_id,
        "date": "2026-10-18",
        "start_time": "12:00",
        "end_time": "10:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "invalid_interval");
  }

  #[tokio::test]
  async fn bad_path_and_query_are_structured_400s() {
    let h = harness().await;
    let (amenity_id, alice) = seed(&h).await;
    let alice = Some(alice.as_str());

    let uri = format!("/api/amenities/{amenity_id}/availability");
    let (status, body) = send(&h.state, "GET", &uri, alice, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "malformed_request");

    let (status, body) = send(&h.state, "GET", "/api/reservations/not-a-uuid", alice, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "malformed_request");

    let (status, body) =
      send(&h.state, "POST", "/api/reservations/not-a-uuid/cancel", alice, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "malformed_request");

    let (status, body) = send(&h.state, "GET", "/api/reservations?status=pending", alice, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "malformed_request");
    assert!(body["detail"].is_string());
  }

  #[tokio::test]
  async fn residents_cannot_use_admin_routes() {
    let h = harness().await;
    let (_, alice) = seed(&h).await;

    let (status, body) = send(
      &h.state,
      "POST",
      "/api/amenities",
      Some(alice.as_str()),
      Some(json!({
        "name": "Gym",
        "capacity": 4,
        "open_time": "06:00",
        "close_time": "23:00",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "forbidden");

    let (status, _) = send(
      &h.state,
      "PUT",
      "/api/settings",
      Some(alice.as_str()),
      Some(json!({ "max_duration": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&h.state, "GET", "/api/reservations?scope=building", Some(alice.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn admin_updates_settings() {
    let h = harness().await;
    let admin = Some(h.admin_token.as_str());

    let (status, before) = send(&h.state, "GET", "/api/settings", admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["max_active_bookings"], 3);

    let (status, after) = send(
      &h.state,
      "PUT",
      "/api/settings",
      admin,
      Some(json!({ "max_duration": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["max_duration"], 2.5);
    assert_eq!(after["min_hours_advance"], 24.0);
  }
}
