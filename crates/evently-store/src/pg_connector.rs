//! Builds the `PostgreSQL` pool behind the shared store handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use evently_core::connection::Connector;
use evently_core::error::DomainError;
use evently_core::repository::StoreHandle;

use crate::pg_document_store::PgDocumentStore;

/// Connects a `PgPool` and wraps it as a [`StoreHandle`].
#[derive(Debug, Clone)]
pub struct PgConnector {
    max_connections: u32,
    acquire_timeout: Duration,
    run_migrations: bool,
}

impl PgConnector {
    /// Creates a connector with the given pool size that runs migrations
    /// after connecting when `run_migrations` is set.
    #[must_use]
    pub fn new(max_connections: u32, run_migrations: bool) -> Self {
        Self {
            max_connections,
            acquire_timeout: Duration::from_secs(5),
            run_migrations,
        }
    }
}

#[async_trait]
impl Connector<StoreHandle> for PgConnector {
    async fn connect(&self, uri: &str) -> Result<StoreHandle, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(uri)
            .await
            .map_err(|e| DomainError::Connection(format!("failed to connect: {e}")))?;

        if self.run_migrations {
            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| DomainError::Connection(format!("migration failed: {e}")))?;
            info!("database migrations applied");
        }

        Ok(Arc::new(PgDocumentStore::new(pool)))
    }
}
