//! The event record: slug derivation, normalization and validation.

use chrono::{DateTime, Utc};
use evently_core::error::DomainError;
use evently_core::model::{Event, EventMode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

static SLUG_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// Derives the URL slug for `title`.
///
/// Lowercases and trims, strips everything except ASCII letters, digits,
/// whitespace and hyphens, then turns whitespace runs and hyphen runs into a
/// single hyphen. A value already in slug form is returned unchanged.
#[must_use]
pub fn derive_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_DISALLOWED.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE_RUN.replace_all(&stripped, "-");
    HYPHEN_RUN.replace_all(&hyphenated, "-").into_owned()
}

/// Trims surrounding whitespace; date ranges and other free text are kept.
#[must_use]
pub fn normalize_date(date: &str) -> String {
    date.trim().to_owned()
}

/// Trims and collapses internal whitespace runs to a single space.
#[must_use]
pub fn normalize_time(time: &str) -> String {
    WHITESPACE_RUN.replace_all(time.trim(), " ").into_owned()
}

/// Caller-supplied fields for a new event.
///
/// Only these fields are accepted from callers; identity, slug, image and
/// timestamps are always system-set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    /// Display title.
    pub title: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
    /// Short overview.
    pub overview: Option<String>,
    /// Venue name.
    pub venue: Option<String>,
    /// City or address.
    pub location: Option<String>,
    /// Free-form date text.
    pub date: Option<String>,
    /// Free-form time text.
    pub time: Option<String>,
    /// `online`, `offline` or `hybrid`.
    pub mode: Option<String>,
    /// Intended audience.
    pub audience: Option<String>,
    /// Organizer name.
    pub organizer: Option<String>,
    /// Agenda items.
    #[serde(default)]
    pub agenda: Vec<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update to an existing event. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    /// New title; regenerates the slug if it differs from the current one.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New overview.
    pub overview: Option<String>,
    /// New image URL.
    pub image: Option<String>,
    /// New venue.
    pub venue: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New date text.
    pub date: Option<String>,
    /// New time text.
    pub time: Option<String>,
    /// New mode.
    pub mode: Option<String>,
    /// New audience.
    pub audience: Option<String>,
    /// New agenda.
    pub agenda: Option<Vec<String>>,
    /// New organizer.
    pub organizer: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
}

/// An event being created or modified.
///
/// Tracks whether the record is new and whether its title was changed, so
/// that `prepare` regenerates the slug only when it has to.
#[derive(Debug, Clone)]
pub struct EventRecord {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    overview: String,
    image: String,
    venue: String,
    location: String,
    date: String,
    time: String,
    mode: String,
    audience: String,
    agenda: Vec<String>,
    organizer: String,
    tags: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    title_modified: bool,
}

impl EventRecord {
    /// Starts a new record from caller fields and the system-set image URL.
    #[must_use]
    pub fn new(payload: EventPayload, image_url: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: payload.title.unwrap_or_default(),
            slug: String::new(),
            description: payload.description.unwrap_or_default(),
            overview: payload.overview.unwrap_or_default(),
            image: image_url,
            venue: payload.venue.unwrap_or_default(),
            location: payload.location.unwrap_or_default(),
            date: payload.date.unwrap_or_default(),
            time: payload.time.unwrap_or_default(),
            mode: payload.mode.unwrap_or_default(),
            audience: payload.audience.unwrap_or_default(),
            agenda: payload.agenda,
            organizer: payload.organizer.unwrap_or_default(),
            tags: payload.tags,
            created_at: None,
            title_modified: false,
        }
    }

    /// Reopens a stored event for modification.
    #[must_use]
    pub fn from_persisted(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            slug: event.slug,
            description: event.description,
            overview: event.overview,
            image: event.image,
            venue: event.venue,
            location: event.location,
            date: event.date,
            time: event.time,
            mode: event.mode.as_str().to_owned(),
            audience: event.audience,
            agenda: event.agenda,
            organizer: event.organizer,
            tags: event.tags,
            created_at: Some(event.created_at),
            title_modified: false,
        }
    }

    /// Returns `true` until the record has been saved once.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.created_at.is_none()
    }

    /// Sets the trimmed title, marking it modified only if the value changes.
    pub fn set_title(&mut self, title: &str) {
        let trimmed = title.trim();
        if trimmed != self.title {
            self.title = trimmed.to_owned();
            self.title_modified = true;
        }
    }

    /// Applies every field present in `changes`.
    pub fn apply(&mut self, changes: EventChanges) {
        let EventChanges {
            title,
            description,
            overview,
            image,
            venue,
            location,
            date,
            time,
            mode,
            audience,
            agenda,
            organizer,
            tags,
        } = changes;
        if let Some(title) = title {
            self.set_title(&title);
        }
        replace(&mut self.description, description);
        replace(&mut self.overview, overview);
        replace(&mut self.image, image);
        replace(&mut self.venue, venue);
        replace(&mut self.location, location);
        replace(&mut self.date, date);
        replace(&mut self.time, time);
        replace(&mut self.mode, mode);
        replace(&mut self.audience, audience);
        replace(&mut self.agenda, agenda);
        replace(&mut self.organizer, organizer);
        replace(&mut self.tags, tags);
    }

    /// Normalizes and validates the record, producing the document to write.
    ///
    /// The slug is derived from the title only when the record is new or its
    /// title was changed. `now` becomes `updated_at`, and `created_at` for a
    /// new record.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending field.
    pub fn prepare(&self, now: DateTime<Utc>) -> Result<Event, DomainError> {
        let title = required("title", &self.title)?;
        let description = required("description", &self.description)?;
        let overview = required("overview", &self.overview)?;
        let image = required("image", &self.image)?;
        let venue = required("venue", &self.venue)?;
        let location = required("location", &self.location)?;
        let date = required("date", &normalize_date(&self.date))?;
        let time = required("time", &normalize_time(&self.time))?;
        let mode: EventMode = required("mode", &self.mode)?.parse()?;
        let audience = required("audience", &self.audience)?;
        if self.agenda.is_empty() {
            return Err(DomainError::validation(
                "agenda",
                "Agenda must have at least 1 item",
            ));
        }
        let organizer = required("organizer", &self.organizer)?;
        if self.tags.is_empty() {
            return Err(DomainError::validation("tags", "Tags must have at least 1 item"));
        }

        let slug = if self.is_new() || self.title_modified {
            derive_slug(&title)
        } else {
            self.slug.clone()
        };
        if slug.is_empty() {
            return Err(DomainError::validation(
                "title",
                "title must contain at least one letter or digit",
            ));
        }

        Ok(Event {
            id: self.id,
            title,
            slug,
            description,
            overview,
            image,
            venue,
            location,
            date,
            time,
            mode,
            audience,
            agenda: self.agenda.clone(),
            organizer,
            tags: self.tags.clone(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Trims `value`, rejecting it if nothing is left.
fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}
