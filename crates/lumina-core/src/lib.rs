//! Core types and trait definitions for Lumina amenity reservations.
//!
//! This crate is free of HTTP and database dependencies.
//! It holds the booking rules, the configuration resolver and the store
//! abstraction every backend implements.

// Store traits declare their futures with explicit `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod amenity;
pub mod availability;
pub mod booking;
pub mod clock;
pub mod error;
pub mod reservation;
pub mod resident;
pub mod settings;
pub mod slot;
pub mod store;
pub mod token;

pub use booking::BookingService;
pub use error::{BookingError, Result};
