//! Test object storage: mock `ObjectStorage` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use evently_core::error::DomainError;
use evently_media::ObjectStorage;

/// Base URL returned by `RecordingObjectStorage`.
pub const TEST_CDN_URL: &str = "https://cdn.test";

/// An object storage that records every upload and returns a URL under
/// `https://cdn.test`.
#[derive(Debug, Default)]
pub struct RecordingObjectStorage {
    uploads: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingObjectStorage {
    /// Returns `(folder, name, byte_len)` for every upload so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingObjectStorage {
    async fn upload(&self, bytes: Vec<u8>, name: &str, folder: &str) -> Result<String, DomainError> {
        self.uploads
            .lock()
            .unwrap()
            .push((folder.to_owned(), name.to_owned(), bytes.len()));
        let path = if folder.is_empty() {
            name.to_owned()
        } else {
            format!("{folder}/{name}")
        };
        Ok(format!("{TEST_CDN_URL}/{path}"))
    }
}

/// An object storage whose uploads always fail.
#[derive(Debug)]
pub struct FailingObjectStorage;

#[async_trait]
impl ObjectStorage for FailingObjectStorage {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _name: &str,
        _folder: &str,
    ) -> Result<String, DomainError> {
        Err(DomainError::Infrastructure("Bunny upload failed: 503".into()))
    }
}
