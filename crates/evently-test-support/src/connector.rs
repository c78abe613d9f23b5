//! Test connectors: scripted `Connector` implementations for tests.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use evently_core::connection::Connector;
use evently_core::error::DomainError;
use evently_core::repository::StoreHandle;

/// A connector that hands out the same store handle on every attempt and
/// counts how many attempts were made.
pub struct StaticConnector {
    handle: StoreHandle,
    attempts: AtomicU32,
}

impl StaticConnector {
    /// Create a connector that always connects to `handle`.
    #[must_use]
    pub fn new(handle: StoreHandle) -> Self {
        Self {
            handle,
            attempts: AtomicU32::new(0),
        }
    }

    /// Number of `connect` calls so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector<StoreHandle> for StaticConnector {
    async fn connect(&self, _uri: &str) -> Result<StoreHandle, DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(self.handle.clone())
    }
}

/// A connector that always fails with a connection error.
#[derive(Debug, Default)]
pub struct FailingConnector {
    attempts: AtomicU32,
}

impl FailingConnector {
    /// Number of `connect` calls so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector<StoreHandle> for FailingConnector {
    async fn connect(&self, _uri: &str) -> Result<StoreHandle, DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::Connection("connection refused".into()))
    }
}
