//! Application layer: command and query handlers, and the facade over them.

pub mod command_handlers;
pub mod facade;
pub mod query_handlers;
