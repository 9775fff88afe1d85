//! # Storage Traits
//!
//! Abstractions over the collaborators the workbook talks to: the photo blob
//! store and the geography sources. Implementations may fail at any time;
//! callers treat failures as "unavailable" and carry on.

use anyhow::Result;
use async_trait::async_trait;
use shared::{PhotoMetadata, PhotoSummary, StateInfo};

/// A stored photo with its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPhoto {
    pub summary: PhotoSummary,
    pub bytes: Vec<u8>,
}

/// Persistent store for photographic evidence
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob and return its id
    async fn put(&self, bytes: Vec<u8>, metadata: &PhotoMetadata) -> Result<String>;

    /// All stored photos, oldest first
    async fn get_all(&self) -> Result<Vec<StoredPhoto>>;

    /// Summaries only, oldest first
    async fn list(&self) -> Result<Vec<PhotoSummary>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .map(|photo| photo.summary)
            .collect())
    }

    /// Delete a blob; returns false when the id is unknown
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// One link of the geography fallback chain
#[async_trait]
pub trait GeographySource: Send + Sync {
    /// Short name reported with results, e.g. "ibge"
    fn name(&self) -> &str;

    /// `Ok(None)` means this source does not provide states
    async fn list_states(&self) -> Result<Option<Vec<StateInfo>>>;

    /// `Ok(None)` means this source does not provide municipalities
    async fn list_municipalities(&self, state_code: &str) -> Result<Option<Vec<String>>>;
}
