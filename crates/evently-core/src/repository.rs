//! Document store abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{Booking, Event};

/// Read/write access to the event and booking collections.
///
/// Implementations enforce slug uniqueness (reporting
/// `DomainError::Conflict`) but no cross-document references: booking
/// referential integrity is checked by the caller before `insert_booking`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new event.
    async fn insert_event(&self, event: &Event) -> Result<(), DomainError>;

    /// Replaces an existing event, matched by id.
    /// Returns `DomainError::NotFound` if no event has that id.
    async fn update_event(&self, event: &Event) -> Result<(), DomainError>;

    /// Finds an event by exact slug.
    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError>;

    /// Checks whether an event with `event_id` exists without loading it.
    async fn event_exists(&self, event_id: Uuid) -> Result<bool, DomainError>;

    /// Lists all events, newest `created_at` first.
    async fn list_events(&self) -> Result<Vec<Event>, DomainError>;

    /// Lists events other than `exclude` that carry at least one of `tags`.
    async fn find_events_sharing_tags(
        &self,
        exclude: Uuid,
        tags: &[String],
    ) -> Result<Vec<Event>, DomainError>;

    /// Inserts a new booking.
    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError>;

    /// Lists bookings for one event, newest `created_at` first.
    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, DomainError>;

    /// Lists bookings made with `email`, newest `created_at` first.
    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, DomainError>;
}

/// Shared handle to a connected document store.
pub type StoreHandle = Arc<dyn DocumentStore>;
