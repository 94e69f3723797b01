//! SQLite backend for Lumina reservations.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Booking commits run inside
//! `BEGIN IMMEDIATE` transactions, and a trigger rejects any overlapping
//! CONFIRMED insert that slips past them.

mod encode;
mod ledger;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
