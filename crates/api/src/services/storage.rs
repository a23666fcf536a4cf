//! Photo object storage.
//!
//! Checkpoint and attendance photos are stored hash-addressed: the file
//! name is the SHA-256 of the photo bytes, so re-submitting the same photo
//! overwrites an identical file and storage never diverges from the
//! `photo_hash` column.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::StorageConfig;

/// Error type for photo storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write photo: {0}")]
    Write(#[from] std::io::Error),

    #[error("Empty photo upload")]
    EmptyPhoto,
}

/// Abstraction over the photo store.
///
/// The filesystem implementation is the only one in production today;
/// the trait exists so tests can substitute an in-memory store.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Persists photo bytes under the given category (e.g. "events",
    /// "attendance") and content hash. Returns the public URL.
    async fn store(&self, category: &str, hash: &str, bytes: &[u8])
        -> Result<String, StorageError>;
}

/// Filesystem-backed photo storage.
///
/// Writes under `root_dir/<category>/<hash>.jpg` and returns URLs under
/// the configured public base URL.
pub struct FilesystemPhotoStorage {
    root_dir: PathBuf,
    public_base_url: String,
}

impl FilesystemPhotoStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root_dir: PathBuf::from(&config.root_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStorage for FilesystemPhotoStorage {
    async fn store(
        &self,
        category: &str,
        hash: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyPhoto);
        }

        let dir = self.root_dir.join(category);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{hash}.jpg");
        let path = dir.join(&file_name);

        // Identical content maps to an identical path, so a concurrent
        // duplicate write is harmless.
        tokio::fs::write(&path, bytes).await?;

        Ok(format!("{}/{}/{}", self.public_base_url, category, file_name))
    }
}

/// In-memory photo storage for tests.
#[cfg(test)]
pub struct InMemoryPhotoStorage {
    pub stored: std::sync::Mutex<Vec<(String, String, usize)>>,
}

#[cfg(test)]
impl InMemoryPhotoStorage {
    pub fn new() -> Self {
        Self {
            stored: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl PhotoStorage for InMemoryPhotoStorage {
    async fn store(
        &self,
        category: &str,
        hash: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyPhoto);
        }
        self.stored
            .lock()
            .unwrap()
            .push((category.to_string(), hash.to_string(), bytes.len()));
        Ok(format!("mem://{}/{}.jpg", category, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::crypto::sha256_hex;

    #[tokio::test]
    async fn test_filesystem_store_and_url() {
        let dir = std::env::temp_dir().join(format!("photo-store-{}", uuid::Uuid::new_v4()));
        let storage = FilesystemPhotoStorage::new(&StorageConfig {
            root_dir: dir.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080/photos/".to_string(),
        });

        let bytes = b"jpeg-bytes";
        let hash = sha256_hex(bytes);
        let url = storage.store("events", &hash, bytes).await.unwrap();

        assert_eq!(url, format!("http://localhost:8080/photos/events/{hash}.jpg"));
        let written = tokio::fs::read(dir.join("events").join(format!("{hash}.jpg")))
            .await
            .unwrap();
        assert_eq!(written, bytes);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_filesystem_rejects_empty_photo() {
        let dir = std::env::temp_dir().join(format!("photo-store-{}", uuid::Uuid::new_v4()));
        let storage = FilesystemPhotoStorage::new(&StorageConfig {
            root_dir: dir.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080/photos".to_string(),
        });

        assert!(matches!(
            storage.store("events", "abc", &[]).await,
            Err(StorageError::EmptyPhoto)
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store_records_writes() {
        let storage = InMemoryPhotoStorage::new();
        let url = storage.store("attendance", "deadbeef", b"x").await.unwrap();
        assert_eq!(url, "mem://attendance/deadbeef.jpg");
        assert_eq!(storage.stored.lock().unwrap().len(), 1);
    }
}
