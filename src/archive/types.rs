//! Wire types for the document archive endpoints.

use crate::api::types::{lenient_timestamp, null_as_default, string_or_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub enriched: u64,
    #[serde(default)]
    pub embedded: u64,
}

/// Pipeline progress (`GET /system/counts`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    #[serde(default)]
    pub files: FileCounts,
    #[serde(default)]
    pub entries: EntryCounts,
}

impl ProcessingStats {
    /// Share of files processed, as a percentage. Zero for an empty archive.
    pub fn processed_percent(&self) -> f64 {
        if self.files.total == 0 {
            return 0.0;
        }
        self.files.processed as f64 * 100.0 / self.files.total as f64
    }
}

/// `GET /system/storage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    #[serde(default)]
    pub total_bytes: u64,
}

/// One row of `GET /system/recent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Image metadata (`GET /images/{id}`). Read-only from the console's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub vision_description: Option<String>,
    #[serde(default)]
    pub vision_model: Option<String>,
}

impl ImageDetails {
    /// True when no AI description exists yet; the console offers "analyze".
    pub fn needs_analysis(&self) -> bool {
        self.vision_description
            .as_deref()
            .map_or(true, |text| text.trim().is_empty())
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }
}
