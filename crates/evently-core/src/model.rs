//! Persisted document shapes.
//!
//! These are the documents exactly as the store holds them. Building one
//! from caller input goes through the record types in `evently-catalog`,
//! which enforce the invariants before anything is written.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// How attendees take part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Remote attendance only.
    Online,
    /// In-person attendance only.
    Offline,
    /// Both remote and in-person attendance.
    Hybrid,
}

impl EventMode {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(DomainError::validation(
                "mode",
                format!("`{other}` is not a valid mode; expected online, offline or hybrid"),
            )),
        }
    }
}

/// A publishable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Store-assigned identity.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Unique URL-safe key derived from the title.
    pub slug: String,
    /// Long-form description.
    pub description: String,
    /// Short overview.
    pub overview: String,
    /// CDN URL of the event image.
    pub image: String,
    /// Venue name.
    pub venue: String,
    /// City or address.
    pub location: String,
    /// Free-form date text (ranges are kept verbatim).
    pub date: String,
    /// Free-form time text.
    pub time: String,
    /// Attendance mode.
    pub mode: EventMode,
    /// Intended audience.
    pub audience: String,
    /// Agenda items, at least one.
    pub agenda: Vec<String>,
    /// Organizer name.
    pub organizer: String,
    /// Tags, at least one.
    pub tags: Vec<String>,
    /// Set once when the event is first saved.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Returns `true` if this event carries at least one of `tags`.
    #[must_use]
    pub fn shares_tag_with(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// One signup for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Store-assigned identity.
    pub id: Uuid,
    /// The booked event.
    pub event_id: Uuid,
    /// Attendee email, lowercased and trimmed.
    pub email: String,
    /// Set once when the booking is first saved.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save.
    pub updated_at: DateTime<Utc>,
}
