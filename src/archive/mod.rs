//! Read-mostly views over the document archive: pipeline counts, storage,
//! recent files and image metadata.
//!
//! The only command here is image analysis, which is one-way: the console
//! fires the request and sees the result on a later fetch.

use crate::api::ApiError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

mod http;
pub mod types;

pub use types::{EntryCounts, FileCounts, ImageDetails, ProcessingStats, RecentFile, StorageStats};

/// Default number of rows in the recent-files list.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Archive endpoints, served by the same backend as the fleet API.
#[async_trait]
pub trait ArchiveSource: Send + Sync + 'static {
    /// `GET /system/counts`
    async fn processing_stats(&self) -> Result<ProcessingStats, ApiError>;

    /// `GET /system/storage`
    async fn storage_stats(&self) -> Result<StorageStats, ApiError>;

    /// `GET /system/recent?limit=`: newest first.
    async fn recent_files(&self, limit: u32) -> Result<Vec<RecentFile>, ApiError>;

    /// `GET /images/{id}`
    async fn image(&self, id: &str) -> Result<ImageDetails, ApiError>;

    /// `GET /images/{id}/full`: raw image content.
    async fn image_bytes(&self, id: &str) -> Result<Vec<u8>, ApiError>;

    /// `POST /images/{id}/analyze`
    async fn analyze_image(&self, id: &str) -> Result<(), ApiError>;
}

/// Fires analysis requests without waiting on them.
#[derive(Clone)]
pub struct AnalyzeTrigger {
    source: Arc<dyn ArchiveSource>,
}

impl AnalyzeTrigger {
    pub fn new(source: Arc<dyn ArchiveSource>) -> Self {
        Self { source }
    }

    /// Request a description for image `id` and return at once.
    ///
    /// Failures are logged, never reported to the caller. The handle is only
    /// for callers that must not exit before the request leaves (the CLI).
    pub fn request(&self, id: &str) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let id = id.to_string();
        tracing::info!(image_id = %id, "Requesting image analysis");

        tokio::spawn(async move {
            match source.analyze_image(&id).await {
                Ok(()) => {
                    metrics::counter!(crate::metrics::IMAGE_ANALYZE_TOTAL, "outcome" => "accepted")
                        .increment(1);
                    tracing::debug!(image_id = %id, "Image analysis accepted");
                }
                Err(e) => {
                    metrics::counter!(crate::metrics::IMAGE_ANALYZE_TOTAL, "outcome" => "failed")
                        .increment(1);
                    tracing::warn!(image_id = %id, error = %e, "Image analysis request failed");
                }
            }
        })
    }
}

/// Human-readable byte count: B, KB, MB, GB, TB with one decimal.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
