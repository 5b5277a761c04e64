use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Metadata tracked for every stored file.
///
/// `created_at` is fixed at the first successful save. `updated_at` moves on every save
/// and access-touch and is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Byte length of the most recently saved content
    pub size: u64,
}

impl FileMetadata {
    pub fn new(filename: impl Into<String>, size: u64, now: DateTime<Utc>) -> Self {
        Self {
            filename: filename.into(),
            created_at: now,
            updated_at: now,
            size,
        }
    }

    /// `created_at` as RFC 3339 with second precision (`2024-01-02T03:04:05Z`)
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `updated_at` as RFC 3339 with second precision
    pub fn updated_at_rfc3339(&self) -> String {
        self.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_record_has_equal_timestamps() {
        let now = Utc::now();
        let meta = FileMetadata::new("a.txt", 3, now);
        assert_eq!(meta.created_at, meta.updated_at);
        assert_eq!(meta.size, 3);
    }

    #[test]
    fn timestamps_format_as_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let meta = FileMetadata::new("a.txt", 3, at);
        assert_eq!(meta.created_at_rfc3339(), "2024-01-02T03:04:05Z");
        assert_eq!(meta.updated_at_rfc3339(), "2024-01-02T03:04:05Z");
    }
}
