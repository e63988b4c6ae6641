use super::{ArchiveSource, ImageDetails, ProcessingStats, RecentFile, StorageStats};
use crate::api::{ApiError, HttpSource};
use async_trait::async_trait;

#[async_trait]
impl ArchiveSource for HttpSource {
    async fn processing_stats(&self) -> Result<ProcessingStats, ApiError> {
        let response = self.send(self.get(&["system", "counts"])?).await?;
        self.decode(response).await
    }

    async fn storage_stats(&self) -> Result<StorageStats, ApiError> {
        let response = self.send(self.get(&["system", "storage"])?).await?;
        self.decode(response).await
    }

    async fn recent_files(&self, limit: u32) -> Result<Vec<RecentFile>, ApiError> {
        let request = self.get(&["system", "recent"])?.query(&[("limit", limit)]);
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn image(&self, id: &str) -> Result<ImageDetails, ApiError> {
        let response = self.send(self.get(&["images", id])?).await?;
        self.decode(response).await
    }

    async fn image_bytes(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.send(self.get(&["images", id, "full"])?).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read image body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    async fn analyze_image(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.post(&["images", id, "analyze"])?).await?;
        Ok(())
    }
}
