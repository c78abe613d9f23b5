//! Integration tests for booking routes.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_booking_round_trip() {
    let test_app = common::build_test_app();
    let (_, created) = common::create_event(test_app.router.clone(), "Rust Meetup", &["rust"]).await;
    let event_id = created["event"]["id"].as_str().unwrap().to_owned();

    // POST /api/bookings
    let (status, json) = common::send_json(
        test_app.router.clone(),
        "POST",
        "/api/bookings",
        &serde_json::json!({ "eventId": event_id, "email": "Ada@Example.com" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["booking"]["email"], "ada@example.com");

    // GET /api/events/{slug}/bookings
    let (status, json) =
        common::get_json(test_app.router.clone(), "/api/events/rust-meetup/bookings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bookings"].as_array().unwrap().len(), 1);

    // GET /api/bookings?email=
    let (status, json) = common::get_json(
        test_app.router,
        "/api/bookings?email=ADA%40example.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let bookings = json["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["eventId"], event_id);
}

#[tokio::test]
async fn test_booking_unknown_event_returns_400() {
    let test_app = common::build_test_app();

    let (status, json) = common::send_json(
        test_app.router,
        "POST",
        "/api/bookings",
        &serde_json::json!({ "eventId": Uuid::new_v4(), "email": "ada@example.com" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Event does not exist");
    assert!(test_app.store.bookings().is_empty());
}

#[tokio::test]
async fn test_bookings_for_unknown_event_returns_404() {
    let test_app = common::build_test_app();

    let (status, _) = common::get_json(test_app.router, "/api/events/missing/bookings").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
