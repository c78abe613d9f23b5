//! Evently Core: shared domain abstractions.
//!
//! This crate defines the persisted document shapes, the document store
//! contract, the error taxonomy, the clock and command traits, and the
//! connection lifecycle manager. It contains no storage-specific code.

pub mod clock;
pub mod command;
pub mod connection;
pub mod error;
pub mod model;
pub mod repository;
