//! Routes for events: listing, detail, creation with image upload, partial
//! updates, similar events and per-event bookings.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use evently_catalog::domain::event::{EventChanges, EventPayload};
use evently_core::model::{Booking, Event};
use evently_media::image::{EVENT_IMAGE_FOLDER, image_object_name, is_allowed_image_type};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body carrying one event.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Outcome summary.
    pub message: &'static str,
    /// The event.
    pub event: Event,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    /// Outcome summary.
    pub message: &'static str,
    /// Events, newest first.
    pub events: Vec<Event>,
}

/// Response body for GET /{slug}/similar.
#[derive(Debug, Serialize)]
pub struct SimilarEventsResponse {
    /// Other events sharing a tag.
    pub events: Vec<Event>,
}

/// Response body for GET /{slug}/bookings.
#[derive(Debug, Serialize)]
pub struct EventBookingsResponse {
    /// Bookings, newest first.
    pub bookings: Vec<Booking>,
}

struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// The multipart form for POST /, before validation.
#[derive(Default)]
struct NewEventForm {
    image: Option<ImageUpload>,
    tags: Option<String>,
    agenda: Option<String>,
    payload: EventPayload,
}

impl NewEventForm {
    /// Reads every part of the form. Parts outside the allowlist are dropped
    /// and a repeated part keeps its first value.
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "image" {
                if form.image.is_some() {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let payload = &mut form.payload;
            let slot = match name.as_str() {
                "tags" => &mut form.tags,
                "agenda" => &mut form.agenda,
                "title" => &mut payload.title,
                "description" => &mut payload.description,
                "overview" => &mut payload.overview,
                "venue" => &mut payload.venue,
                "location" => &mut payload.location,
                "date" => &mut payload.date,
                "time" => &mut payload.time,
                "mode" => &mut payload.mode,
                "audience" => &mut payload.audience,
                "organizer" => &mut payload.organizer,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(field.text().await?);
            }
        }
        Ok(form)
    }
}

/// Parses a JSON-encoded string array form field. An absent field is empty
/// and left for record validation to reject.
fn parse_string_list(field: &str, raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|_| {
            ApiError::bad_request(field, format!("{field} must be a JSON array of strings"))
        }),
    }
}

/// GET /
#[instrument(skip(state))]
async fn list_events(State(state): State<AppState>) -> Result<Json<EventListResponse>, ApiError> {
    let events = state.facade.list_events().await?;
    Ok(Json(EventListResponse {
        message: "Events fetched successfully",
        events,
    }))
}

/// POST / (multipart)
#[instrument(skip(state, multipart))]
async fn create_event(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let form = NewEventForm::read(multipart).await?;

    let Some(image) = form.image else {
        return Err(ApiError::bad_request("image", "Image file is required"));
    };
    let mut payload = form.payload;
    payload.tags = parse_string_list("tags", form.tags.as_deref())?;
    payload.agenda = parse_string_list("agenda", form.agenda.as_deref())?;

    if !is_allowed_image_type(&image.content_type) {
        return Err(ApiError::bad_request("image", "Invalid file type"));
    }

    let object_name = image_object_name(state.clock.now(), &image.file_name);
    let image_url = state
        .media
        .upload(image.bytes, &object_name, EVENT_IMAGE_FOLDER)
        .await?;
    info!(%image_url, "event image uploaded");

    let event = state.facade.create_event(payload, image_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event created successfully",
            event,
        }),
    ))
}

/// GET /{slug}
#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.facade.get_event_by_slug(&slug).await?;
    Ok(Json(EventResponse {
        message: "Event fetched successfully",
        event,
    }))
}

/// PATCH /{slug}
#[instrument(skip(state, changes))]
async fn update_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(changes): Json<EventChanges>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.facade.update_event(&slug, changes).await?;
    Ok(Json(EventResponse {
        message: "Event updated successfully",
        event,
    }))
}

/// GET /{slug}/similar
#[instrument(skip(state))]
async fn similar_events(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SimilarEventsResponse>, ApiError> {
    let events = state.facade.get_similar_events(&slug).await?;
    Ok(Json(SimilarEventsResponse { events }))
}

/// GET /{slug}/bookings
#[instrument(skip(state))]
async fn event_bookings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<EventBookingsResponse>, ApiError> {
    let event = state.facade.get_event_by_slug(&slug).await?;
    let bookings = state.facade.list_bookings_for_event(event.id).await?;
    Ok(Json(EventBookingsResponse { bookings }))
}

/// Returns the router for events. Request bodies are capped at
/// `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{slug}", get(get_event).patch(update_event))
        .route("/{slug}/similar", get(similar_events))
        .route("/{slug}/bookings", get(event_bookings))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use evently_test_support::{FailingObjectStorage, InMemoryDocumentStore, StaticConnector};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
    use crate::routes::test_state::{in_memory_state, state_with, unreachable_state};

    const BOUNDARY: &str = "evently-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            name: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            bytes: &'a [u8],
        },
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; \
                             filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn event_fields() -> Vec<Part<'static>> {
        vec![
            Part::Text("title", "Rust Meetup"),
            Part::Text("description", "A day of talks"),
            Part::Text("overview", "Talks and workshops"),
            Part::Text("venue", "Hall A"),
            Part::Text("location", "Berlin"),
            Part::Text("date", "2026-03-01"),
            Part::Text("time", "10:00 AM"),
            Part::Text("mode", "hybrid"),
            Part::Text("audience", "Developers"),
            Part::Text("organizer", "Evently"),
            Part::Text("tags", r#"["rust","meetup"]"#),
            Part::Text("agenda", r#"["Keynote"]"#),
        ]
    }

    fn png(file_name: &'static str) -> Part<'static> {
        Part::File {
            name: "image",
            file_name,
            content_type: "image/png",
            bytes: b"\x89PNG",
        }
    }

    async fn json_of(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_event_returns_201_with_uploaded_image_url() {
        // Arrange
        let (state, store) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts = event_fields();
        parts.push(png("team photo.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_of(response).await;
        assert_eq!(json["message"], "Event created successfully");
        assert_eq!(json["event"]["slug"], "rust-meetup");
        assert_eq!(
            json["event"]["image"],
            "https://cdn.test/events/1768471200000-team-photo.png"
        );
        assert_eq!(json["event"]["tags"], serde_json::json!(["rust", "meetup"]));
        assert_eq!(store.events().len(), 1);
    }

    #[tokio::test]
    async fn test_create_event_without_image_returns_400() {
        // Arrange
        let (state, store) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);

        // Act
        let response = app
            .oneshot(multipart_request(&event_fields()))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["message"], "Image file is required");
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_create_event_rejects_disallowed_image_type() {
        // Arrange
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts = event_fields();
        parts.push(Part::File {
            name: "image",
            file_name: "anim.gif",
            content_type: "image/gif",
            bytes: b"GIF89a",
        });

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["message"], "Invalid file type");
    }

    #[tokio::test]
    async fn test_create_event_rejects_malformed_tags() {
        // Arrange
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts: Vec<Part<'_>> = event_fields()
            .into_iter()
            .filter(|p| !matches!(p, Part::Text("tags", _)))
            .collect();
        parts.push(Part::Text("tags", "rust, meetup"));
        parts.push(png("a.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["field"], "tags");
    }

    #[tokio::test]
    async fn test_create_event_ignores_fields_outside_allowlist() {
        // Arrange
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts = event_fields();
        parts.push(Part::Text("slug", "hijacked"));
        parts.push(png("a.png"));
        parts.push(Part::Text("image", "https://evil.test/x.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_of(response).await;
        assert_eq!(json["event"]["slug"], "rust-meetup");
        assert_eq!(
            json["event"]["image"],
            "https://cdn.test/events/1768471200000-a.png"
        );
    }

    #[tokio::test]
    async fn test_create_event_returns_500_when_upload_fails() {
        // Arrange
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = state_with(
            Arc::new(StaticConnector::new(store.clone())),
            Arc::new(FailingObjectStorage),
        );
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts = event_fields();
        parts.push(png("a.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(response).await["error"], "infrastructure_error");
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_create_event_with_missing_title_returns_400() {
        // Arrange
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts: Vec<Part<'_>> = event_fields()
            .into_iter()
            .filter(|p| !matches!(p, Part::Text("title", _)))
            .collect();
        parts.push(png("a.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["field"], "title");
    }

    #[tokio::test]
    async fn test_get_event_returns_404_for_unknown_slug() {
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);

        let response = app.oneshot(get("/missing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_list_events_returns_500_when_store_unreachable() {
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(unreachable_state());

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(response).await["error"], "connection_error");
    }

    #[tokio::test]
    async fn test_similar_events_returns_empty_when_store_unreachable() {
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(unreachable_state());

        let response = app.oneshot(get("/rust-meetup/similar")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["events"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_update_event_returns_422_for_wrong_field_type() {
        // Arrange
        let (state, _) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let request = Request::builder()
            .method("PATCH")
            .uri("/rust-meetup")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"tags": "rust"}"#))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert: Axum returns 422 for deserialization failures.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_event_keeps_first_value_of_repeated_parts() {
        // Arrange
        let (state, store) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let mut parts = event_fields();
        parts.push(Part::Text("title", "Second Title"));
        parts.push(png("first.png"));
        parts.push(png("second.png"));

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_of(response).await;
        assert_eq!(json["event"]["title"], "Rust Meetup");
        assert_eq!(json["event"]["slug"], "rust-meetup");
        assert_eq!(
            json["event"]["image"],
            "https://cdn.test/events/1768471200000-first.png"
        );
        assert_eq!(store.events().len(), 1);
    }

    #[tokio::test]
    async fn test_create_event_accepts_image_over_two_mebibytes() {
        // Arrange
        let (state, store) = in_memory_state();
        let app = router(DEFAULT_MAX_UPLOAD_BYTES).with_state(state);
        let image = vec![0_u8; 3 * 1024 * 1024];
        let mut parts: Vec<Part<'_>> = event_fields();
        parts.push(Part::File {
            name: "image",
            file_name: "poster.png",
            content_type: "image/png",
            bytes: &image,
        });

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.events().len(), 1);
    }

    #[tokio::test]
    async fn test_create_event_over_upload_limit_returns_413() {
        // Arrange
        let (state, store) = in_memory_state();
        let app = router(64 * 1024).with_state(state);
        let image = vec![0_u8; 128 * 1024];
        let mut parts: Vec<Part<'_>> = event_fields();
        parts.push(Part::File {
            name: "image",
            file_name: "poster.png",
            content_type: "image/png",
            bytes: &image,
        });

        // Act
        let response = app.oneshot(multipart_request(&parts)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_of(response).await;
        assert_eq!(json["error"], "payload_too_large");
        assert!(json.get("field").is_none());
        assert!(store.events().is_empty());
    }
}
