//! Bunny CDN storage uploader.

use std::fmt;

use async_trait::async_trait;
use evently_core::error::DomainError;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument, warn};

use crate::ObjectStorage;

const DEFAULT_REGION: &str = "de";

/// Storage zone credentials and CDN location.
#[derive(Clone, PartialEq, Eq)]
pub struct BunnyConfig {
    /// Storage zone name.
    pub storage_zone: String,
    /// Storage zone password, sent as the `AccessKey` header.
    pub api_key: String,
    /// Public CDN base URL that uploaded paths are appended to.
    pub cdn_url: String,
    /// Storage region code; `de` is the primary region.
    pub region: String,
    /// Explicit storage API base URL, overriding the one derived from
    /// `region`.
    pub endpoint: Option<String>,
}

impl BunnyConfig {
    /// Reads `BUNNY_STORAGE_ZONE`, `BUNNY_STORAGE_API_KEY`, `BUNNY_CDN_URL`
    /// and `BUNNY_STORAGE_REGION` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` naming the first missing variable.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` naming the first missing variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    DomainError::Configuration(format!("{key} environment variable is required"))
                })
        };

        Ok(Self {
            storage_zone: required("BUNNY_STORAGE_ZONE")?,
            api_key: required("BUNNY_STORAGE_API_KEY")?,
            cdn_url: required("BUNNY_CDN_URL")?,
            region: lookup("BUNNY_STORAGE_REGION")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            endpoint: None,
        })
    }

    /// Storage API base URL for the configured region.
    #[must_use]
    pub fn storage_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None if self.region == DEFAULT_REGION => "https://storage.bunnycdn.com".to_owned(),
            None => format!("https://{}.storage.bunnycdn.com", self.region),
        }
    }
}

impl fmt::Debug for BunnyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BunnyConfig")
            .field("storage_zone", &self.storage_zone)
            .field("api_key", &"<redacted>")
            .field("cdn_url", &self.cdn_url)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Joins `folder` and `name`, or returns `name` alone for the root folder.
fn object_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_owned()
    } else {
        format!("{folder}/{name}")
    }
}

/// Uploads objects to a Bunny storage zone over its HTTP API.
#[derive(Debug, Clone)]
pub struct BunnyStorage {
    client: reqwest::Client,
    config: Result<BunnyConfig, DomainError>,
}

impl BunnyStorage {
    /// Creates an uploader for `config`.
    #[must_use]
    pub fn new(config: BunnyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: Ok(config),
        }
    }

    /// Creates an uploader from the environment. Missing configuration does
    /// not fail here; it is reported by every `upload` call instead.
    #[must_use]
    pub fn from_env() -> Self {
        let config = BunnyConfig::from_env();
        if let Err(err) = &config {
            warn!(error = %err, "object storage is not configured; uploads will fail");
        }
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ObjectStorage for BunnyStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, bytes: Vec<u8>, name: &str, folder: &str) -> Result<String, DomainError> {
        let config = self.config.as_ref().map_err(Clone::clone)?;
        let path = object_path(folder, name);
        let url = format!(
            "{}/{}/{}",
            config.storage_endpoint(),
            config.storage_zone,
            path
        );

        let response = self
            .client
            .put(&url)
            .header("AccessKey", &config.api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Bunny upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Infrastructure(format!(
                "Bunny upload failed: {}",
                status.as_u16()
            )));
        }

        info!(%path, "uploaded object to storage zone");
        Ok(format!("{}/{}", config.cdn_url, path))
    }
}
