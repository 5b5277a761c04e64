//! In-memory metadata index.
//!
//! The map is guarded by a reader/writer lock: listings and lookups share the lock,
//! saves and touches take it exclusively. Callers only ever receive cloned snapshots,
//! so a record can never be observed half-updated. The lock is synchronous and is
//! never held across an `.await`.

use chrono::{DateTime, Duration, Utc};
use filestore_core::FileMetadata;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct MetadataStore {
    records: RwLock<HashMap<String, FileMetadata>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the record for `filename`.
    ///
    /// A new record gets `created_at == updated_at`. An existing record keeps its
    /// `created_at`; `size` and `updated_at` change together under the write lock.
    pub fn put(&self, filename: &str, size: u64) {
        let mut records = self.write();
        match records.get_mut(filename) {
            Some(meta) => {
                meta.updated_at = next_timestamp(meta.updated_at);
                meta.size = size;
            }
            None => {
                records.insert(
                    filename.to_string(),
                    FileMetadata::new(filename, size, Utc::now()),
                );
            }
        }
    }

    /// Snapshot of a single record
    pub fn get(&self, filename: &str) -> Option<FileMetadata> {
        self.read().get(filename).cloned()
    }

    /// Consistent snapshot of every record, ordered by filename
    pub fn get_all(&self) -> Vec<FileMetadata> {
        let mut all: Vec<FileMetadata> = self.read().values().cloned().collect();
        all.sort_by(|a, b| a.filename.cmp(&b.filename));
        all
    }

    /// Move `updated_at` forward. Unknown filenames are ignored.
    pub fn touch(&self, filename: &str) {
        if let Some(meta) = self.write().get_mut(filename) {
            meta.updated_at = next_timestamp(meta.updated_at);
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a record torn (every mutation is a
    // plain field store), so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, FileMetadata>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, FileMetadata>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Current time, bumped past `previous` when the clock has not advanced.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
