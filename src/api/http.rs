//! reqwest-backed implementation of [`ServerSource`].

use super::{
    ApiError, ErrorBody, JoinCommand, JoinCommandRequest, NewServer, ProbeOutcome, ProbeSummary,
    PullJob, Server, ServerId, ServerList, ServerSource,
};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the fleet API.
///
/// Holds one pooled `reqwest::Client`; clone the source (or wrap it in an
/// `Arc`) rather than building several.
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// Base URL without trailing slash (e.g., "http://localhost:8000/api")
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpSource {
    /// Build a source from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(&config.base_url, client, timeout))
    }

    /// Build a source around an existing client (for testing).
    pub fn with_client(base_url: &str, client: Client, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so an id containing `/` or `..` stays inside its own segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = |reason: String| {
            ApiError::Network(format!("Invalid API URL '{}': {}", self.base_url, reason))
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.get(self.url(segments)?))
    }

    pub(crate) fn post(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.post(self.url(segments)?))
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Send a request and turn non-2xx replies into [`ApiError::Rejected`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout_ms()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_detail)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        tracing::debug!(status = status.as_u16(), detail = %detail, "Fleet API rejected request");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    /// Read the whole body and decode it as `T`.
    pub(crate) async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response body: {}", e)))?;
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Decode the body if possible, otherwise fall back to `T::default()`.
    /// Used for endpoints whose reply body is advisory.
    async fn decode_or_default<T: DeserializeOwned + Default>(&self, response: Response) -> T {
        match self.decode(response).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring undecodable advisory body");
                T::default()
            }
        }
    }
}

#[async_trait]
impl ServerSource for HttpSource {
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        let response = self.send(self.get(&["servers"])?).await?;
        let list: ServerList = self.decode(response).await?;
        Ok(list.servers)
    }

    async fn create_server(&self, server: &NewServer) -> Result<Server, ApiError> {
        let response = self.send(self.post(&["servers"])?.json(server)).await?;
        self.decode(response).await
    }

    async fn test_server(&self, id: &ServerId) -> Result<ProbeOutcome, ApiError> {
        let response = self.send(self.post(&["servers", id.as_str(), "test"])?).await?;
        Ok(self.decode_or_default(response).await)
    }

    async fn test_all(&self) -> Result<ProbeSummary, ApiError> {
        let response = self.send(self.post(&["servers", "test-all"])?).await?;
        Ok(self.decode_or_default(response).await)
    }

    async fn delete_server(&self, id: &ServerId) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&["servers", id.as_str()])?);
        self.send(request).await?;
        Ok(())
    }

    async fn pull_model(&self, id: &ServerId, model: &str) -> Result<PullJob, ApiError> {
        let request = self
            .post(&["servers", id.as_str(), "pull-model"])?
            .json(&serde_json::json!({ "name": model }));
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn join_command(&self, request: &JoinCommandRequest) -> Result<JoinCommand, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = &request.server_id {
            query.push(("server_id", id.to_string()));
        }
        if let Some(name) = &request.worker_name {
            query.push(("worker_name", name.clone()));
        }
        let response = self.send(self.get(&["workers", "command"])?.query(&query)).await?;
        self.decode(response).await
    }
}
