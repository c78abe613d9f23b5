//! Evently: object storage for event images.
//!
//! Event images are uploaded to an external CDN storage zone before the
//! event is created; the returned URL is stored verbatim on the event.

pub mod bunny;
pub mod image;

use async_trait::async_trait;
use evently_core::error::DomainError;

pub use bunny::{BunnyConfig, BunnyStorage};

/// Uploads binary objects and returns their public URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` as `name` inside `folder` (the root when `folder` is
    /// empty) and returns the public URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the storage is not configured,
    /// or `DomainError::Infrastructure` if the remote call fails.
    async fn upload(&self, bytes: Vec<u8>, name: &str, folder: &str) -> Result<String, DomainError>;
}
