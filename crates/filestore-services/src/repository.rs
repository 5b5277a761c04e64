//! Content repository: stored bytes plus their metadata.
//!
//! The content write happens first and the metadata update only after it succeeds, so
//! a failed write never leaves a metadata record for content that does not exist.
//! Saves of the same filename are serialized, so the recorded size always belongs to
//! the content that won the last write.

use crate::metadata_store::MetadataStore;
use bytes::Bytes;
use filestore_core::FileMetadata;
use filestore_storage::{Storage, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone)]
pub struct ContentRepository {
    storage: Arc<dyn Storage>,
    metadata: Arc<MetadataStore>,
    save_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ContentRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            metadata: Arc::new(MetadataStore::new()),
            save_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Write `data` under `filename`, then record its size and timestamps.
    pub async fn save(&self, filename: &str, data: Bytes) -> StorageResult<()> {
        let size = data.len() as u64;
        let _guard = self.lock_filename(filename).await;
        self.storage.write(filename, data).await?;
        self.metadata.put(filename, size);

        tracing::debug!(filename = %filename, size_bytes = size, "Saved file content and metadata");
        Ok(())
    }

    /// Read stored content. Missing files surface as `StorageError::NotFound`.
    pub async fn get(&self, filename: &str) -> StorageResult<Vec<u8>> {
        self.storage.read(filename).await
    }

    pub fn list(&self) -> Vec<FileMetadata> {
        self.metadata.get_all()
    }

    /// Refresh `updated_at` after an access. Never fails; unknown names are ignored.
    pub fn touch_access(&self, filename: &str) {
        self.metadata.touch(filename);
    }

    pub fn metadata(&self, filename: &str) -> Option<FileMetadata> {
        self.metadata.get(filename)
    }

    async fn lock_filename(&self, filename: &str) -> OwnedMutexGuard<()> {
        let lock = {
            // The map only hands out lock handles, so a poisoned map is still usable.
            let mut locks = self.save_locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(filename.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filestore_storage::{LocalStorage, StorageBackend, StorageError};
    use tempfile::{tempdir, TempDir};

    /// Storage double whose writes and reads always fail with an I/O error.
    struct BrokenStorage;

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn write(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
            Err(StorageError::WriteFailed("disk full".to_string()))
        }

        async fn read(&self, _key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::ReadFailed("device error".to_string()))
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    async fn setup_repo() -> (ContentRepository, TempDir) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        (ContentRepository::new(Arc::new(storage)), dir)
    }

    #[tokio::test]
    async fn test_save_then_get_round_trip() {
        let (repo, dir) = setup_repo().await;
        let data = Bytes::from_static(b"hello world");

        repo.save("new.txt", data.clone()).await.unwrap();

        assert_eq!(repo.get("new.txt").await.unwrap(), data.to_vec());
        assert_eq!(std::fs::read(dir.path().join("new.txt")).unwrap(), data.to_vec());

        let meta = repo.metadata("new.txt").unwrap();
        assert_eq!(meta.size, data.len() as u64);
        assert_eq!(meta.created_at, meta.updated_at);
    }

    #[tokio::test]
    async fn test_overwrite_updates_size_and_timestamp() {
        let (repo, _dir) = setup_repo().await;

        repo.save("update.txt", Bytes::from_static(b"old")).await.unwrap();
        let first = repo.metadata("update.txt").unwrap();

        let new_data = Bytes::from_static(b"new content longer");
        repo.save("update.txt", new_data.clone()).await.unwrap();
        let second = repo.metadata("update.txt").unwrap();

        assert_eq!(repo.get("update.txt").await.unwrap(), new_data.to_vec());
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.size, new_data.len() as u64);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (repo, _dir) = setup_repo().await;
        let result = repo.get("missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_metadata() {
        let repo = ContentRepository::new(Arc::new(BrokenStorage));

        let result = repo.save("doomed.txt", Bytes::from_static(b"data")).await;
        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
        assert!(repo.list().is_empty());
        assert!(repo.metadata("doomed.txt").is_none());
    }

    #[tokio::test]
    async fn test_read_failure_is_distinct_from_not_found() {
        let repo = ContentRepository::new(Arc::new(BrokenStorage));
        let result = repo.get("any.txt").await;
        assert!(matches!(result, Err(StorageError::ReadFailed(_))));
    }

    #[tokio::test]
    async fn test_list_after_three_saves() {
        let (repo, _dir) = setup_repo().await;
        for name in ["a.txt", "b.jpg", "c.dat"] {
            repo.save(name, Bytes::from_static(b"abc")).await.unwrap();
        }

        let list = repo.list();
        assert_eq!(list.len(), 3);
        for name in ["a.txt", "b.jpg", "c.dat"] {
            let meta = list.iter().find(|m| m.filename == name).unwrap();
            assert_eq!(meta.size, 3);
            assert_eq!(meta.created_at, meta.updated_at);
        }
    }

    #[tokio::test]
    async fn test_touch_access_on_unknown_creates_nothing() {
        let (repo, _dir) = setup_repo().await;
        repo.touch_access("ghost.txt");
        assert!(repo.list().is_empty());
        assert!(matches!(
            repo.get("ghost.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_saves() {
        let (repo, _dir) = setup_repo().await;

        let mut handles = Vec::new();
        for n in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.save(&format!("concurrent_{}.txt", n), Bytes::from_static(b"data"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.list().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overwrites_keep_size_in_step_with_content() {
        let (repo, dir) = setup_repo().await;

        for _round in 0..10 {
            let mut handles = Vec::new();
            for n in 1..=16usize {
                let repo = repo.clone();
                handles.push(tokio::spawn(async move {
                    repo.save("contested.bin", Bytes::from(vec![b'x'; n * 1024]))
                        .await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let on_disk = std::fs::read(dir.path().join("contested.bin")).unwrap();
            let meta = repo.metadata("contested.bin").unwrap();
            assert_eq!(meta.size, on_disk.len() as u64);
            assert_eq!(repo.get("contested.bin").await.unwrap().len(), on_disk.len());
        }
        assert_eq!(repo.list().len(), 1);
    }
}
