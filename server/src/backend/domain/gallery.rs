//! Photo gallery: upload policy and access to the blob store.
//!
//! Photos are accepted when either the declared MIME type or the file
//! extension names a supported image format, the file is not empty and it
//! fits the size limit. Store failures never propagate as panics; listing
//! degrades to an empty, "unavailable" response.

use log::{info, warn};
use shared::{PhotoListResponse, PhotoMetadata, PhotoUploadResponse};
use std::sync::Arc;

use crate::backend::storage::{BlobStore, StoredPhoto};

pub const DEFAULT_MAX_SIZE_MB: u64 = 16;

pub const DEFAULT_ALLOWED_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
    "image/heif",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GalleryError {
    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedType(String),
    #[error("Arquivo de {size} bytes excede o limite de {max_mb} MB")]
    TooLarge { size: u64, max_mb: u64 },
    #[error("Arquivo vazio")]
    Empty,
    #[error("Photo {0} not found")]
    NotFound(String),
    #[error("Photo store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPolicy {
    allowed_types: Vec<String>,
    max_size_mb: u64,
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            DEFAULT_MAX_SIZE_MB,
        )
    }
}

impl PhotoPolicy {
    pub fn new(allowed_types: Vec<String>, max_size_mb: u64) -> Self {
        Self {
            allowed_types: allowed_types
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            max_size_mb,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }

    fn allows(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|allowed| allowed == mime_type)
    }

    /// Accepted MIME type for an upload, falling back to the file extension
    /// when the declared type is missing or generic
    pub fn resolve_mime(&self, name: &str, declared: &str) -> Option<String> {
        let declared = declared
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if self.allows(&declared) {
            return Some(declared);
        }

        let guessed = guess_mime_from_name(name)?;
        self.allows(guessed).then(|| guessed.to_string())
    }

    /// Validate an upload, returning the MIME type to store it under
    pub fn check(&self, name: &str, declared: &str, size: u64) -> Result<String, GalleryError> {
        if size == 0 {
            return Err(GalleryError::Empty);
        }
        if size > self.max_bytes() {
            return Err(GalleryError::TooLarge {
                size,
                max_mb: self.max_size_mb,
            });
        }
        self.resolve_mime(name, declared).ok_or_else(|| {
            GalleryError::UnsupportedType(if declared.trim().is_empty() {
                name.to_string()
            } else {
                declared.trim().to_string()
            })
        })
    }
}

fn guess_mime_from_name(name: &str) -> Option<&'static str> {
    let (_, extension) = name.rsplit_once('.')?;
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct GalleryService {
    store: Arc<dyn BlobStore>,
    policy: PhotoPolicy,
}

impl GalleryService {
    pub fn new(store: Arc<dyn BlobStore>, policy: PhotoPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &PhotoPolicy {
        &self.policy
    }

    pub async fn upload(
        &self,
        name: &str,
        declared_mime: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUploadResponse, GalleryError> {
        let size = bytes.len() as u64;
        let mime_type = self.policy.check(name, declared_mime, size).map_err(|e| {
            warn!("Rejected photo '{}': {}", name, e);
            e
        })?;

        let metadata = PhotoMetadata {
            name: name.to_string(),
            mime_type: mime_type.clone(),
        };
        let id = self
            .store
            .put(bytes, &metadata)
            .await
            .map_err(|e| GalleryError::StoreUnavailable(e.to_string()))?;

        info!("Photo '{}' stored as {}", name, id);
        Ok(PhotoUploadResponse {
            id,
            name: metadata.name,
            mime_type,
            size_bytes: size,
        })
    }

    pub async fn list(&self) -> PhotoListResponse {
        match self.store.list().await {
            Ok(photos) => PhotoListResponse {
                photos,
                available: true,
            },
            Err(e) => {
                warn!("Photo store unavailable while listing: {}", e);
                PhotoListResponse {
                    photos: Vec::new(),
                    available: false,
                }
            }
        }
    }

    /// All photos with their bytes; `None` when the store cannot be read
    pub async fn all_photos(&self) -> Option<Vec<StoredPhoto>> {
        match self.store.get_all().await {
            Ok(photos) => Some(photos),
            Err(e) => {
                warn!("Photo store unavailable while reading: {}", e);
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), GalleryError> {
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| GalleryError::StoreUnavailable(e.to_string()))?;
        if deleted {
            Ok(())
        } else {
            Err(GalleryError::NotFound(id.to_string()))
        }
    }
}
