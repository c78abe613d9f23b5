//! Image upload rules.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// MIME types accepted for event images.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Folder that event images are stored under.
pub const EVENT_IMAGE_FOLDER: &str = "events";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid regex"));

/// Returns `true` if `mime` is an accepted image type.
#[must_use]
pub fn is_allowed_image_type(mime: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime)
}

/// Builds a collision-resistant object name: upload time in milliseconds,
/// then the original file name with every whitespace character replaced by
/// a hyphen.
#[must_use]
pub fn image_object_name(now: DateTime<Utc>, original: &str) -> String {
    format!(
        "{}-{}",
        now.timestamp_millis(),
        WHITESPACE.replace_all(original, "-")
    )
}
