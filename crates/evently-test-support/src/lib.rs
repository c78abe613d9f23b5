//! Shared test doubles and utilities for the Evently event-listing service.

mod clock;
mod connector;
mod storage;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use connector::{FailingConnector, StaticConnector};
pub use storage::{FailingObjectStorage, RecordingObjectStorage, TEST_CDN_URL};
pub use store::{FailingDocumentStore, InMemoryDocumentStore};
