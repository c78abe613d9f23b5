//! Command handlers for the event catalog.
//!
//! Each handler builds a record, runs its validation, and only then writes
//! to the store, so a failed check never leaves a partial document behind.

use evently_core::clock::Clock;
use evently_core::command::Command;
use evently_core::error::DomainError;
use evently_core::model::{Booking, Event};
use evently_core::repository::DocumentStore;
use tracing::info;

use crate::domain::booking::{BookingRecord, EVENT_DOES_NOT_EXIST};
use crate::domain::commands::{CreateBooking, CreateEvent, UpdateEvent};
use crate::domain::event::EventRecord;

/// Handles the `CreateEvent` command: validates the payload, derives the
/// slug, and inserts the event.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a field is invalid,
/// `DomainError::Conflict` if the slug is already taken, or the store's error
/// if the insert fails.
pub async fn handle_create_event(
    command: &CreateEvent,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<Event, DomainError> {
    let record = EventRecord::new(command.payload.clone(), command.image_url.clone());
    let event = record.prepare(clock.now())?;

    store.insert_event(&event).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        event_id = %event.id,
        slug = %event.slug,
        "event created"
    );
    Ok(event)
}

/// Handles the `UpdateEvent` command: loads the event by slug, applies the
/// changes, and writes it back. The slug changes only if the title did.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no event has the slug,
/// `DomainError::Validation` if a changed field is invalid,
/// `DomainError::Conflict` if a new title collides with another event's slug.
pub async fn handle_update_event(
    command: &UpdateEvent,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<Event, DomainError> {
    let slug = command.slug.trim();
    if slug.is_empty() {
        return Err(DomainError::NotFound("event slug is empty".into()));
    }
    let existing = store
        .find_event_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("event `{slug}`")))?;

    let mut record = EventRecord::from_persisted(existing);
    record.apply(command.changes.clone());
    let event = record.prepare(clock.now())?;

    store.update_event(&event).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        event_id = %event.id,
        slug = %event.slug,
        "event updated"
    );
    Ok(event)
}

/// Handles the `CreateBooking` command.
///
/// # Errors
///
/// See [`save_booking`].
pub async fn handle_create_booking(
    command: &CreateBooking,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<Booking, DomainError> {
    let record = BookingRecord::new(command.event_id, &command.email);
    let booking = save_booking(&record, clock, store).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        booking_id = %booking.id,
        event_id = %booking.event_id,
        "booking created"
    );
    Ok(booking)
}

/// The single write path for bookings: email format, then existence of the
/// referenced event, then the insert. Runs both checks on every save.
///
/// The existence check and the insert are separate store calls with no
/// transaction around them, so an event removed in between leaves a
/// dangling booking. That window is accepted.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the email is malformed,
/// `DomainError::ReferentialIntegrity` if the event does not exist, or the
/// store's error if a call fails.
pub async fn save_booking(
    record: &BookingRecord,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<Booking, DomainError> {
    let booking = record.prepare(clock.now())?;

    if !store.event_exists(booking.event_id).await? {
        return Err(DomainError::ReferentialIntegrity(
            EVENT_DOES_NOT_EXIST.to_owned(),
        ));
    }

    store.insert_booking(&booking).await?;
    Ok(booking)
}
