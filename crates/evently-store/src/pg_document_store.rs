//! `PostgreSQL` implementation of the `DocumentStore` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use evently_core::error::DomainError;
use evently_core::model::{Booking, Event};
use evently_core::repository::DocumentStore;

/// PostgreSQL-backed document store.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

/// Maps a write error, reporting a unique-index violation on `slug` as a
/// conflict.
fn map_event_write_error(err: &sqlx::Error, slug: &str) -> DomainError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::Conflict(format!("an event with slug `{slug}` already exists"))
        }
        other => infrastructure(other),
    }
}

/// Maps a booking write error, reporting the email check constraint as a
/// validation failure.
fn map_booking_write_error(err: &sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db) if db.is_check_violation() => {
            DomainError::validation("email", "Invalid email format")
        }
        other => infrastructure(other),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_event(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO events (id, slug, tags, document, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.id)
        .bind(&event.slug)
        .bind(&event.tags[..])
        .bind(Json(event))
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_event_write_error(&e, &event.slug))?;

        debug!(event_id = %event.id, slug = %event.slug, "inserted event document");
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE events SET slug = $2, tags = $3, document = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.slug)
        .bind(&event.tags[..])
        .bind(Json(event))
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_event_write_error(&e, &event.slug))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("event {}", event.id)));
        }
        debug!(event_id = %event.id, slug = %event.slug, "updated event document");
        Ok(())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError> {
        let row: Option<Json<Event>> =
            sqlx::query_scalar("SELECT document FROM events WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;
        Ok(row.map(|Json(event)| event))
    }

    async fn event_exists(&self, event_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| infrastructure(&e))
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        let rows: Vec<Json<Event>> =
            sqlx::query_scalar("SELECT document FROM events ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(|Json(event)| event).collect())
    }

    async fn find_events_sharing_tags(
        &self,
        exclude: Uuid,
        tags: &[String],
    ) -> Result<Vec<Event>, DomainError> {
        let rows: Vec<Json<Event>> = sqlx::query_scalar(
            "SELECT document FROM events WHERE id <> $1 AND tags && $2 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(exclude)
        .bind(tags)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(|Json(event)| event).collect())
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO bookings (id, event_id, email, document, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(booking.id)
        .bind(booking.event_id)
        .bind(&booking.email)
        .bind(Json(booking))
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_booking_write_error(&e))?;

        debug!(booking_id = %booking.id, event_id = %booking.event_id, "inserted booking document");
        Ok(())
    }

    async fn list_bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<Json<Booking>> = sqlx::query_scalar(
            "SELECT document FROM bookings WHERE event_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(|Json(booking)| booking).collect())
    }

    async fn find_bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<Json<Booking>> = sqlx::query_scalar(
            "SELECT document FROM bookings WHERE email = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;
        Ok(rows.into_iter().map(|Json(booking)| booking).collect())
    }
}
