//! Evently: event catalog and bookings.
//!
//! Responsible for the event and booking records (slug derivation, field
//! normalization, validation), the write paths that enforce uniqueness and
//! referential integrity, and the query facade the HTTP layer calls.

pub mod application;
pub mod domain;
