//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use evently_catalog::application::facade::QueryFacade;
use evently_core::clock::Clock;
use evently_core::connection::ConnectionManager;
use evently_test_support::{
    InMemoryDocumentStore, RecordingObjectStorage, StaticConnector, SteppingClock,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use evently_api::app;
use evently_api::config::DEFAULT_MAX_UPLOAD_BYTES;
use evently_api::state::AppState;

pub const BOUNDARY: &str = "evently-test-boundary";

/// Clock starting at 2026-01-15 10:00 UTC and advancing one second per
/// reading, so successive writes are strictly ordered.
fn stepping_clock() -> Arc<dyn Clock> {
    Arc::new(SteppingClock::new(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
        chrono::TimeDelta::seconds(1),
    ))
}

/// Handles to the doubles behind a test app.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryDocumentStore>,
    pub media: Arc<RecordingObjectStorage>,
    pub connector: Arc<StaticConnector>,
}

/// Build the full app router over an in-memory store and a recording object
/// storage. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    let clock = stepping_clock();
    let store = Arc::new(InMemoryDocumentStore::new());
    let connector = Arc::new(StaticConnector::new(store.clone()));
    let media = Arc::new(RecordingObjectStorage::default());
    let connections = Arc::new(ConnectionManager::new(
        Some("postgres://localhost/test".to_owned()),
        connector.clone(),
    ));
    let facade = Arc::new(QueryFacade::new(connections, clock.clone()));
    let router = app(
        AppState::new(facade, media.clone(), clock),
        DEFAULT_MAX_UPLOAD_BYTES,
    );

    TestApp {
        router,
        store,
        media,
        connector,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a new event as multipart form data with a PNG image.
pub async fn create_event(
    app: Router,
    title: &str,
    tags: &[&str],
) -> (StatusCode, serde_json::Value) {
    let tags = serde_json::to_string(tags).unwrap();
    let fields = [
        ("title", title),
        ("description", "A day of talks"),
        ("overview", "Talks and workshops"),
        ("venue", "Hall A"),
        ("location", "Berlin"),
        ("date", "2026-03-01"),
        ("time", "10:00 AM"),
        ("mode", "online"),
        ("audience", "Developers"),
        ("organizer", "Evently"),
        ("agenda", r#"["Keynote"]"#),
        ("tags", tags.as_str()),
    ];

    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\x89PNG\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/events")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
