//! The operation surface other layers call.
//!
//! `QueryFacade` acquires the shared store handle from its
//! `ConnectionManager` for every operation and delegates to the command and
//! query handlers.

use std::sync::Arc;

use evently_core::clock::Clock;
use evently_core::connection::ConnectionManager;
use evently_core::error::DomainError;
use evently_core::model::{Booking, Event};
use evently_core::repository::StoreHandle;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{command_handlers, query_handlers};
use crate::domain::commands::{CreateBooking, CreateEvent, UpdateEvent};
use crate::domain::event::{EventChanges, EventPayload};

/// Read/write operations over events and bookings.
#[derive(Clone)]
pub struct QueryFacade {
    connections: Arc<ConnectionManager<StoreHandle>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for QueryFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFacade")
            .field("connections", &self.connections)
            .finish_non_exhaustive()
    }
}

impl QueryFacade {
    /// Creates a facade over `connections`, stamping writes with `clock`.
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager<StoreHandle>>, clock: Arc<dyn Clock>) -> Self {
        Self { connections, clock }
    }

    /// Returns `true` once the store connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connections.is_connected()
    }

    /// Retrieves an event by slug.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the slug is blank (without
    /// acquiring a connection) or unknown; connection errors otherwise.
    #[instrument(skip(self))]
    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Event, DomainError> {
        if slug.trim().is_empty() {
            return Err(DomainError::NotFound("event slug is empty".into()));
        }
        let store = self.connections.acquire().await?;
        query_handlers::get_event_by_slug(slug, store.as_ref()).await
    }

    /// Lists every event, newest first.
    ///
    /// # Errors
    ///
    /// Returns connection or store errors.
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        let store = self.connections.acquire().await?;
        query_handlers::list_events(store.as_ref()).await
    }

    /// Lists other events sharing a tag with the event at `slug`. Failures
    /// other than an unknown slug, including failing to connect, degrade to
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the slug is blank or unknown.
    #[instrument(skip(self))]
    pub async fn get_similar_events(&self, slug: &str) -> Result<Vec<Event>, DomainError> {
        if slug.trim().is_empty() {
            return Err(DomainError::NotFound("event slug is empty".into()));
        }
        let store = match self.connections.acquire().await {
            Ok(store) => store,
            Err(err) => {
                warn!(%slug, error = %err, "similar events lookup failed; returning none");
                return Ok(Vec::new());
            }
        };
        query_handlers::get_similar_events(slug, store.as_ref()).await
    }

    /// Creates an event from allowlisted caller fields and the URL of its
    /// already-uploaded image.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation`, `DomainError::Conflict` for a taken
    /// slug, or connection errors. Nothing is written on failure.
    #[instrument(skip(self, payload))]
    pub async fn create_event(
        &self,
        payload: EventPayload,
        image_url: String,
    ) -> Result<Event, DomainError> {
        let store = self.connections.acquire().await?;
        let command = CreateEvent {
            correlation_id: Uuid::new_v4(),
            payload,
            image_url,
        };
        command_handlers::handle_create_event(&command, self.clock.as_ref(), store.as_ref()).await
    }

    /// Applies `changes` to the event at `slug`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound`, `DomainError::Validation`,
    /// `DomainError::Conflict`, or connection errors.
    #[instrument(skip(self, changes))]
    pub async fn update_event(
        &self,
        slug: &str,
        changes: EventChanges,
    ) -> Result<Event, DomainError> {
        let store = self.connections.acquire().await?;
        let command = UpdateEvent {
            correlation_id: Uuid::new_v4(),
            slug: slug.to_owned(),
            changes,
        };
        command_handlers::handle_update_event(&command, self.clock.as_ref(), store.as_ref()).await
    }

    /// Books `email` onto the event `event_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a malformed email,
    /// `DomainError::ReferentialIntegrity` if the event does not exist, or
    /// connection errors.
    #[instrument(skip(self, email))]
    pub async fn create_booking(&self, event_id: Uuid, email: &str) -> Result<Booking, DomainError> {
        let store = self.connections.acquire().await?;
        let command = CreateBooking {
            correlation_id: Uuid::new_v4(),
            event_id,
            email: email.to_owned(),
        };
        command_handlers::handle_create_booking(&command, self.clock.as_ref(), store.as_ref())
            .await
    }

    /// Lists the bookings for `event_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns connection or store errors.
    #[instrument(skip(self))]
    pub async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        let store = self.connections.acquire().await?;
        query_handlers::list_bookings_for_event(event_id, store.as_ref()).await
    }

    /// Lists the bookings made with `email`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a malformed email, or connection
    /// or store errors.
    #[instrument(skip(self, email))]
    pub async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, DomainError> {
        let store = self.connections.acquire().await?;
        query_handlers::find_bookings_by_email(email, store.as_ref()).await
    }
}
