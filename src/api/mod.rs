//! Client side of the fleet API.
//!
//! [`ServerSource`] is the seam between the console's view model and the
//! backend that owns compute servers. [`HttpSource`] talks to the real
//! REST API; tests substitute a scripted source.

use async_trait::async_trait;

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod types;

pub use error::ApiError;
pub use http::HttpSource;
pub use types::{
    JoinCommand, JoinCommandRequest, NewServer, ProbeOutcome, ProbeSummary, PullJob, Server,
    ServerId, ServerStatus,
};
pub(crate) use types::{ErrorBody, ServerList};

/// Remote source of compute-server state and the commands that mutate it.
///
/// Object-safe; shared as `Arc<dyn ServerSource>`. Every method is one
/// round trip, and dropping a returned future abandons the request.
#[async_trait]
pub trait ServerSource: Send + Sync + 'static {
    /// `GET /servers`: the full fleet, in backend order.
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError>;

    /// `POST /servers`.
    async fn create_server(&self, server: &NewServer) -> Result<Server, ApiError>;

    /// `POST /servers/{id}/test`: trigger a health probe.
    async fn test_server(&self, id: &ServerId) -> Result<ProbeOutcome, ApiError>;

    /// `POST /servers/test-all`.
    async fn test_all(&self) -> Result<ProbeSummary, ApiError>;

    /// `DELETE /servers/{id}`. The backend refuses servers with workers.
    async fn delete_server(&self, id: &ServerId) -> Result<(), ApiError>;

    /// `POST /servers/{id}/pull-model`: start an asynchronous model download.
    async fn pull_model(&self, id: &ServerId, model: &str) -> Result<PullJob, ApiError>;

    /// `GET /workers/command`.
    async fn join_command(&self, request: &JoinCommandRequest) -> Result<JoinCommand, ApiError>;
}
