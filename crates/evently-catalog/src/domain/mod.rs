//! Domain records and commands.

pub mod booking;
pub mod commands;
pub mod event;
