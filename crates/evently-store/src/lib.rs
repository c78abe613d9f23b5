//! PostgreSQL persistence for events and bookings.
//!
//! Each document is stored whole as JSONB, with the fields the queries
//! filter or sort on extracted into indexed columns.

pub mod pg_connector;
pub mod pg_document_store;

pub use pg_connector::PgConnector;
pub use pg_document_store::PgDocumentStore;
