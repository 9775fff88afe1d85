//! Filesystem photo store.
//!
//! Layout under the data directory:
//! - `photos/<id>.<ext>` - the photo bytes as uploaded
//! - `photos/photos.csv` - index with one line per photo
//!
//! The index is rewritten through a temp file and renamed into place, so a
//! crash never leaves a half-written index behind. CSV encoding happens in
//! memory; all file access goes through `tokio::fs`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use csv::{Reader, Writer};
use log::{info, warn};
use shared::{PhotoMetadata, PhotoSummary};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::traits::{BlobStore, StoredPhoto};

const PHOTOS_DIR: &str = "photos";
const INDEX_FILE: &str = "photos.csv";
const INDEX_HEADER: [&str; 6] = ["id", "name", "mime_type", "size_bytes", "created_at", "file_name"];

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    summary: PhotoSummary,
    file_name: String,
}

/// CSV-indexed photo store rooted at a data directory
pub struct FsPhotoStore {
    photos_dir: PathBuf,
    /// Serializes index rewrites
    index_lock: Mutex<()>,
}

impl FsPhotoStore {
    /// Create the store, creating `<data_dir>/photos` if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let photos_dir = data_dir.join(PHOTOS_DIR);
        fs::create_dir_all(&photos_dir)
            .with_context(|| format!("Failed to create photo directory {}", photos_dir.display()))?;
        info!("Photo store initialized at {}", photos_dir.display());
        Ok(Self {
            photos_dir,
            index_lock: Mutex::new(()),
        })
    }

    fn index_path(&self) -> PathBuf {
        self.photos_dir.join(INDEX_FILE)
    }

    async fn read_index(&self) -> Result<Vec<IndexEntry>> {
        let path = self.index_path();
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read photo index {}", path.display()));
            }
        };

        let mut csv_reader = Reader::from_reader(contents.as_slice());
        let mut entries = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            entries.push(IndexEntry {
                summary: PhotoSummary {
                    id: record.get(0).unwrap_or("").to_string(),
                    name: record.get(1).unwrap_or("").to_string(),
                    mime_type: record.get(2).unwrap_or("").to_string(),
                    size_bytes: record.get(3).unwrap_or("0").parse::<u64>().unwrap_or(0),
                    created_at: record.get(4).unwrap_or("").to_string(),
                },
                file_name: record.get(5).unwrap_or("").to_string(),
            });
        }

        Ok(entries)
    }

    async fn write_index(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(INDEX_HEADER)?;
        for entry in entries {
            let size = entry.summary.size_bytes.to_string();
            csv_writer.write_record([
                entry.summary.id.as_str(),
                entry.summary.name.as_str(),
                entry.summary.mime_type.as_str(),
                size.as_str(),
                entry.summary.created_at.as_str(),
                entry.file_name.as_str(),
            ])?;
        }
        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to encode photo index: {}", e.error()))?;

        let path = self.index_path();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;
        Ok(())
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        _ => "bin",
    }
}

#[async_trait]
impl BlobStore for FsPhotoStore {
    async fn put(&self, bytes: Vec<u8>, metadata: &PhotoMetadata) -> Result<String> {
        let _guard = self.index_lock.lock().await;

        let id = Uuid::new_v4().to_string();
        let file_name = format!("{}.{}", id, extension_for(&metadata.mime_type));
        tokio::fs::write(self.photos_dir.join(&file_name), &bytes).await?;

        let mut entries = self.read_index().await?;
        entries.push(IndexEntry {
            summary: PhotoSummary {
                id: id.clone(),
                name: metadata.name.clone(),
                mime_type: metadata.mime_type.clone(),
                size_bytes: bytes.len() as u64,
                created_at: Utc::now().to_rfc3339(),
            },
            file_name,
        });
        self.write_index(&entries).await?;

        info!("Stored photo {} ({} bytes)", id, bytes.len());
        Ok(id)
    }

    async fn get_all(&self) -> Result<Vec<StoredPhoto>> {
        let entries = self.read_index().await?;
        let mut photos = Vec::with_capacity(entries.len());

        for entry in entries {
            match tokio::fs::read(self.photos_dir.join(&entry.file_name)).await {
                Ok(bytes) => photos.push(StoredPhoto {
                    summary: entry.summary,
                    bytes,
                }),
                Err(e) => warn!("Photo {} listed in index but unreadable: {}", entry.summary.id, e),
            }
        }

        Ok(photos)
    }

    async fn list(&self) -> Result<Vec<PhotoSummary>> {
        Ok(self
            .read_index()
            .await?
            .into_iter()
            .map(|entry| entry.summary)
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.index_lock.lock().await;

        let mut entries = self.read_index().await?;
        let Some(position) = entries.iter().position(|entry| entry.summary.id == id) else {
            return Ok(false);
        };
        let removed = entries.remove(position);
        self.write_index(&entries).await?;

        let blob_path = self.photos_dir.join(&removed.file_name);
        if let Err(e) = tokio::fs::remove_file(&blob_path).await {
            warn!("Failed to remove photo file {}: {}", blob_path.display(), e);
        }

        info!("Deleted photo {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_store() -> (FsPhotoStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FsPhotoStore::new(temp_dir.path()).expect("Failed to create store");
        (store, temp_dir)
    }

    fn jpeg(name: &str) -> PhotoMetadata {
        PhotoMetadata {
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get_all() {
        let (store, _temp_dir) = setup_test_store();

        let first = store.put(vec![1, 2, 3], &jpeg("curral.jpg")).await.unwrap();
        let second = store.put(vec![4, 5], &jpeg("pasto.jpg")).await.unwrap();

        let photos = store.get_all().await.unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].summary.id, first);
        assert_eq!(photos[0].summary.name, "curral.jpg");
        assert_eq!(photos[0].bytes, vec![1, 2, 3]);
        assert_eq!(photos[1].summary.id, second);
        assert_eq!(photos[1].summary.size_bytes, 2);
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let store = FsPhotoStore::new(temp_dir.path()).unwrap();
            store.put(vec![9; 10], &jpeg("sede, fachada.jpg")).await.unwrap()
        };

        let reopened = FsPhotoStore::new(temp_dir.path()).unwrap();
        let summaries = reopened.list().await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].name, "sede, fachada.jpg");
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_file() {
        let (store, temp_dir) = setup_test_store();
        let id = store.put(vec![1], &jpeg("a.jpg")).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());

        assert!(store.list().await.unwrap().is_empty());
        let blob = temp_dir.path().join(PHOTOS_DIR).join(format!("{}.jpg", id));
        assert!(!blob.exists());
    }

    #[tokio::test]
    async fn test_concurrent_puts_all_reach_the_index() {
        let (store, _temp_dir) = setup_test_store();

        let (meta_a, meta_b, meta_c) = (jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg"));
        let (a, b, c) = tokio::join!(
            store.put(vec![1], &meta_a),
            store.put(vec![2, 2], &meta_b),
            store.put(vec![3, 3, 3], &meta_c),
        );
        let ids = [a.unwrap(), b.unwrap(), c.unwrap()];

        let photos = store.get_all().await.unwrap();
        assert_eq!(photos.len(), 3);
        for id in &ids {
            assert!(photos.iter().any(|photo| &photo.summary.id == id));
        }
        assert!(!store.index_path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (store, _temp_dir) = setup_test_store();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
