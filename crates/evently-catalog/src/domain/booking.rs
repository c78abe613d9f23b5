//! The booking record: email normalization and validation.

use chrono::{DateTime, Utc};
use evently_core::error::DomainError;
use evently_core::model::Booking;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Message reported for malformed email addresses.
pub const INVALID_EMAIL: &str = "Invalid email format";

/// Message reported when a booking references a missing event.
pub const EVENT_DOES_NOT_EXIST: &str = "Event does not exist";

/// Trims and lowercases an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns `true` if `email`, once normalized, looks like `local@domain.tld`.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(&normalize_email(email))
}

/// A booking being saved.
#[derive(Debug, Clone)]
pub struct BookingRecord {
    id: Uuid,
    event_id: Uuid,
    email: String,
    created_at: Option<DateTime<Utc>>,
}

impl BookingRecord {
    /// Starts a new booking for `event_id`.
    #[must_use]
    pub fn new(event_id: Uuid, email: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_id,
            email: email.to_owned(),
            created_at: None,
        }
    }

    /// Normalizes and validates the email, producing the document to write.
    ///
    /// This covers the checks local to the booking. The existence of the
    /// referenced event is checked by the save path against the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` on the `email` field if the address
    /// is malformed.
    pub fn prepare(&self, now: DateTime<Utc>) -> Result<Booking, DomainError> {
        let email = normalize_email(&self.email);
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(DomainError::validation("email", INVALID_EMAIL));
        }
        Ok(Booking {
            id: self.id,
            event_id: self.event_id,
            email,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}
