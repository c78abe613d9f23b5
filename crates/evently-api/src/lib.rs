//! Evently HTTP API: configuration, telemetry, error mapping and routes.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router. `max_upload_bytes` caps the body of
/// event creation requests.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/events", routes::events::router(max_upload_bytes))
        .nest("/api/bookings", routes::bookings::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
