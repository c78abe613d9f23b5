//! Commands for the event catalog.

use evently_core::command::Command;
use uuid::Uuid;

use super::event::{EventChanges, EventPayload};

/// Command to create an event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Allowlisted caller fields.
    pub payload: EventPayload,
    /// URL of the already-uploaded image.
    pub image_url: String,
}

impl Command for CreateEvent {
    fn command_type(&self) -> &'static str {
        "catalog.create_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to modify an existing event.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Current slug of the event.
    pub slug: String,
    /// Fields to change.
    pub changes: EventChanges,
}

impl Command for UpdateEvent {
    fn command_type(&self) -> &'static str {
        "catalog.update_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to book attendance at an event.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event being booked.
    pub event_id: Uuid,
    /// Attendee email as entered.
    pub email: String,
}

impl Command for CreateBooking {
    fn command_type(&self) -> &'static str {
        "catalog.create_booking"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
