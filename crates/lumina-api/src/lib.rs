//! JSON REST API for Lumina.
//!
//! Exposes an axum [`Router`] backed by any [`lumina_core::store::BookingStore`].
//! Authentication, TLS and transport concerns are the caller's
//! responsibility: every request must already carry the authenticated
//! [`lumina_core::resident::Requester`] as a request extension.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lumina_api::api_router(bookings.clone()))
//! ```

pub mod amenities;
pub mod error;
pub mod reservations;
pub mod residents;
pub mod settings;

use axum::{
  Router,
  routing::{get, post},
};
use lumina_core::{BookingService, store::BookingStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `bookings`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(bookings: BookingService<S>) -> Router<()>
where
  S: BookingStore + 'static,
{
  Router::new()
    // Reservations
    .route(
      "/reservations",
      get(reservations::list::<S>).post(reservations::submit::<S>),
    )
    .route("/reservations/{id}", get(reservations::get_one::<S>))
    .route("/reservations/{id}/cancel", post(reservations::cancel::<S>))
    // Amenities
    .route("/amenities", get(amenities::list::<S>).post(amenities::create::<S>))
    .route("/amenities/{id}", get(amenities::get_one::<S>))
    .route("/amenities/{id}/availability", get(amenities::availability::<S>))
    // Settings
    .route("/settings", get(settings::get::<S>).put(settings::update::<S>))
    // Residents
    .route("/residents", get(residents::list::<S>).post(residents::create::<S>))
    .route("/me", get(residents::me))
    .with_state(bookings)
}
