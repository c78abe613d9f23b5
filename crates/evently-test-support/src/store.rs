//! Test stores: in-memory and failing `DocumentStore` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use evently_core::error::DomainError;
use evently_core::model::{Booking, Event};
use evently_core::repository::DocumentStore;
use uuid::Uuid;

/// A document store kept in memory. Enforces slug uniqueness the way the
/// PostgreSQL store's unique index does, and nothing else.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    events: Mutex<Vec<Event>>,
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored events in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Returns a snapshot of all stored bookings in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }
}

fn newest_first_events(events: &mut [Event]) {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn newest_first_bookings(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_event(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.lock().unwrap();
        if events.iter().any(|e| e.slug == event.slug) {
            return Err(DomainError::Conflict(format!(
                "an event with slug `{}` already exists",
                event.slug
            )));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.lock().unwrap();
        if events
            .iter()
            .any(|e| e.id != event.id && e.slug == event.slug)
        {
            return Err(DomainError::Conflict(format!(
                "an event with slug `{}` already exists",
                event.slug
            )));
        }
        let existing = events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| DomainError::NotFound(format!("event {}", event.id)))?;
        *existing = event.clone();
        Ok(())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn event_exists(&self, event_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.events.lock().unwrap().iter().any(|e| e.id == event_id))
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        let mut events = self.events();
        newest_first_events(&mut events);
        Ok(events)
    }

    async fn find_events_sharing_tags(
        &self,
        exclude: Uuid,
        tags: &[String],
    ) -> Result<Vec<Event>, DomainError> {
        let mut events: Vec<Event> = self
            .events()
            .into_iter()
            .filter(|e| e.id != exclude && e.shares_tag_with(tags))
            .collect();
        newest_first_events(&mut events);
        Ok(events)
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError> {
        self.bookings.lock().unwrap().push(booking.clone());
        Ok(())
    }

    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        let mut bookings: Vec<Booking> = self
            .bookings()
            .into_iter()
            .filter(|b| b.event_id == event_id)
            .collect();
        newest_first_bookings(&mut bookings);
        Ok(bookings)
    }

    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, DomainError> {
        let mut bookings: Vec<Booking> = self
            .bookings()
            .into_iter()
            .filter(|b| b.email == email)
            .collect();
        newest_first_bookings(&mut bookings);
        Ok(bookings)
    }
}

/// A document store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentStore;

fn refused<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn insert_event(&self, _event: &Event) -> Result<(), DomainError> {
        refused()
    }

    async fn update_event(&self, _event: &Event) -> Result<(), DomainError> {
        refused()
    }

    async fn find_event_by_slug(&self, _slug: &str) -> Result<Option<Event>, DomainError> {
        refused()
    }

    async fn event_exists(&self, _event_id: Uuid) -> Result<bool, DomainError> {
        refused()
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        refused()
    }

    async fn find_events_sharing_tags(
        &self,
        _exclude: Uuid,
        _tags: &[String],
    ) -> Result<Vec<Event>, DomainError> {
        refused()
    }

    async fn insert_booking(&self, _booking: &Booking) -> Result<(), DomainError> {
        refused()
    }

    async fn list_bookings_for_event(
        &self,
        _event_id: Uuid,
    ) -> Result<Vec<Booking>, DomainError> {
        refused()
    }

    async fn find_bookings_by_email(&self, _email: &str) -> Result<Vec<Booking>, DomainError> {
        refused()
    }
}
