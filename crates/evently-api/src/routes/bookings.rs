//! Routes for bookings.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use evently_core::model::Booking;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// The event being booked.
    #[serde(alias = "event_id")]
    pub event_id: Uuid,
    /// Attendee email address.
    pub email: String,
}

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    /// Attendee email address.
    pub email: String,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Outcome summary.
    pub message: &'static str,
    /// The saved booking.
    pub booking: Booking,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    /// Bookings, newest first.
    pub bookings: Vec<Booking>,
}

/// POST /
#[instrument(skip(state, request), fields(event_id = %request.event_id))]
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let booking = state
        .facade
        .create_booking(request.event_id, &request.email)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: "Booking created successfully",
            booking,
        }),
    ))
}

/// GET /?email=
#[instrument(skip(state, query))]
async fn bookings_by_email(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let bookings = state.facade.find_bookings_by_email(&query.email).await?;
    Ok(Json(BookingListResponse { bookings }))
}

/// Returns the router for bookings.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(bookings_by_email).post(create_booking))
}
