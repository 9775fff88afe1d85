//! In-memory photo store, used when no data directory is writable and in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{PhotoMetadata, PhotoSummary};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{BlobStore, StoredPhoto};

#[derive(Default)]
pub struct MemoryPhotoStore {
    photos: RwLock<Vec<StoredPhoto>>,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryPhotoStore {
    async fn put(&self, bytes: Vec<u8>, metadata: &PhotoMetadata) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let summary = PhotoSummary {
            id: id.clone(),
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            size_bytes: bytes.len() as u64,
            created_at: Utc::now().to_rfc3339(),
        };
        self.photos.write().await.push(StoredPhoto { summary, bytes });
        Ok(id)
    }

    async fn get_all(&self) -> Result<Vec<StoredPhoto>> {
        Ok(self.photos.read().await.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut photos = self.photos.write().await;
        let before = photos.len();
        photos.retain(|photo| photo.summary.id != id);
        Ok(photos.len() != before)
    }
}
