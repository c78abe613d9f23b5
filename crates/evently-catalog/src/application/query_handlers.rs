//! Query handlers for the event catalog.

use evently_core::error::DomainError;
use evently_core::model::{Booking, Event};
use evently_core::repository::DocumentStore;
use tracing::warn;
use uuid::Uuid;

use crate::domain::booking::{INVALID_EMAIL, normalize_email, validate_email};

/// Retrieves an event by slug. The slug is trimmed before the lookup; an
/// empty slug is reported as not found without querying the store.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the slug is empty or unknown, or the
/// store's error if the lookup fails.
pub async fn get_event_by_slug(slug: &str, store: &dyn DocumentStore) -> Result<Event, DomainError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(DomainError::NotFound("event slug is empty".into()));
    }
    store
        .find_event_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("event `{slug}`")))
}

/// Lists every event, newest first. An empty catalog is not an error.
///
/// # Errors
///
/// Returns the store's error if the lookup fails.
pub async fn list_events(store: &dyn DocumentStore) -> Result<Vec<Event>, DomainError> {
    store.list_events().await
}

/// Lists the other events that share at least one tag with the event at
/// `slug`.
///
/// An unknown slug is reported as `NotFound`. Any other failure is logged
/// and degrades to an empty list, so a lookup error reads the same as "no
/// similar events" to the caller.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the slug is empty or unknown.
pub async fn get_similar_events(
    slug: &str,
    store: &dyn DocumentStore,
) -> Result<Vec<Event>, DomainError> {
    let event = match get_event_by_slug(slug, store).await {
        Ok(event) => event,
        Err(err @ DomainError::NotFound(_)) => return Err(err),
        Err(err) => {
            warn!(%slug, error = %err, "similar events lookup failed; returning none");
            return Ok(Vec::new());
        }
    };

    match store.find_events_sharing_tags(event.id, &event.tags).await {
        Ok(events) => Ok(events),
        Err(err) => {
            warn!(%slug, error = %err, "similar events lookup failed; returning none");
            Ok(Vec::new())
        }
    }
}

/// Lists the bookings for one event, newest first.
///
/// # Errors
///
/// Returns the store's error if the lookup fails.
pub async fn list_bookings_for_event(
    event_id: Uuid,
    store: &dyn DocumentStore,
) -> Result<Vec<Booking>, DomainError> {
    store.list_bookings_for_event(event_id).await
}

/// Lists the bookings made with `email`, newest first. The address is
/// normalized the same way it was when the bookings were saved.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `email` is malformed, or the store's
/// error if the lookup fails.
pub async fn find_bookings_by_email(
    email: &str,
    store: &dyn DocumentStore,
) -> Result<Vec<Booking>, DomainError> {
    if !validate_email(email) {
        return Err(DomainError::validation("email", INVALID_EMAIL));
    }
    store.find_bookings_by_email(&normalize_email(email)).await
}
