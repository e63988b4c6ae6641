//! Operator actions against the fleet.
//!
//! Each action is an independent future; several may be outstanding at once.
//! After an action reaches the backend the registry is refreshed so the
//! console shows the backend's state rather than a local guess.

mod error;

pub use error::ActionError;

use crate::api::{
    ApiError, JoinCommand, JoinCommandRequest, NewServer, ProbeOutcome, ProbeSummary, PullJob,
    Server, ServerId, ServerSource,
};
use crate::registry::{RefreshOutcome, ServerRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Highest priority accepted for a new server.
pub const MAX_PRIORITY: i64 = 100;

/// Check add-server input and build the request body.
///
/// Name and URL are trimmed and must be non-empty; priority must be 0..=100.
pub fn validate_new_server(name: &str, url: &str, priority: i64) -> Result<NewServer, ActionError> {
    let name = name.trim();
    let url = url.trim();
    if name.is_empty() {
        return Err(ActionError::Validation("Name is required".to_string()));
    }
    if url.is_empty() {
        return Err(ActionError::Validation("URL is required".to_string()));
    }
    let priority = u8::try_from(priority)
        .ok()
        .filter(|p| i64::from(*p) <= MAX_PRIORITY)
        .ok_or_else(|| {
            ActionError::Validation(format!("Priority must be between 0 and {}", MAX_PRIORITY))
        })?;

    Ok(NewServer {
        name: name.to_string(),
        url: url.to_string(),
        priority,
    })
}

/// Trim a model name, rejecting blank input.
pub fn validate_model_name(model: &str) -> Result<&str, ActionError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ActionError::Validation("Model name is required".to_string()));
    }
    Ok(model)
}

/// Clears the fleet-wide test flag when dropped.
struct TestAllGuard(Arc<AtomicBool>);

impl Drop for TestAllGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Executes operator commands and keeps the registry in step.
///
/// Clones share the fleet-wide "test all" flag.
#[derive(Clone)]
pub struct ActionDispatcher {
    source: Arc<dyn ServerSource>,
    registry: Arc<ServerRegistry>,
    testing_all: Arc<AtomicBool>,
}

impl ActionDispatcher {
    pub fn new(source: Arc<dyn ServerSource>, registry: Arc<ServerRegistry>) -> Self {
        Self {
            source,
            registry,
            testing_all: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    /// Refresh the registry now.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.registry.refresh(self.source.as_ref()).await
    }

    /// Trigger a health probe on one server. Refreshes either way.
    pub async fn test_server(&self, id: &ServerId) -> Result<ProbeOutcome, ActionError> {
        let result = self.source.test_server(id).await;
        let result = self.finish("test_server", Some(id), result);
        self.refresh().await;
        result
    }

    /// False while a "test all" is outstanding.
    pub fn test_all_enabled(&self) -> bool {
        !self.testing_all.load(Ordering::SeqCst)
    }

    /// Trigger health probes on every server. Refreshes either way.
    ///
    /// Only one runs at a time; a second call while one is outstanding is
    /// rejected with [`ActionError::Busy`] and sends nothing.
    pub async fn test_all(&self) -> Result<ProbeSummary, ActionError> {
        if self.testing_all.swap(true, Ordering::SeqCst) {
            self.count("test_all", "busy");
            return Err(ActionError::Busy("test all"));
        }
        let _guard = TestAllGuard(Arc::clone(&self.testing_all));

        let result = self.source.test_all().await;
        let result = self.finish("test_all", None, result);
        self.refresh().await;
        result
    }

    /// Register a new server. Refreshes only when the backend accepted it.
    pub async fn add_server(
        &self,
        name: &str,
        url: &str,
        priority: i64,
    ) -> Result<Server, ActionError> {
        let request = validate_new_server(name, url, priority)
            .inspect_err(|e| self.count("add_server", e.outcome_label()))?;

        let result = self.source.create_server(&request).await;
        let created = self.finish("add_server", None, result)?;
        tracing::info!(server_id = %created.id, name = %created.name, "Server added");
        self.refresh().await;
        Ok(created)
    }

    /// Remove a server.
    ///
    /// Refused without a remote call while the last snapshot shows attached
    /// workers. Otherwise the backend decides and the registry is refreshed.
    pub async fn delete_server(&self, id: &ServerId) -> Result<(), ActionError> {
        if let Some(reason) = self
            .registry
            .view()
            .get(id)
            .and_then(Server::delete_blocked_reason)
        {
            tracing::warn!(server_id = %id, "Delete blocked: server has active workers");
            self.count("delete_server", "blocked");
            return Err(ActionError::Precondition(reason));
        }

        let result = self.source.delete_server(id).await;
        let result = self.finish("delete_server", Some(id), result);
        self.refresh().await;
        result
    }

    /// Ask a server to download a model. Only the submission is tracked.
    pub async fn pull_model(&self, id: &ServerId, model: &str) -> Result<PullJob, ActionError> {
        let model = validate_model_name(model)
            .inspect_err(|e| self.count("pull_model", e.outcome_label()))?;

        let result = self.source.pull_model(id, model).await;
        let result = self.finish("pull_model", Some(id), result);
        if let Ok(job) = &result {
            tracing::info!(server_id = %id, model = %model, job_id = %job.job_id, "Model pull started");
        }
        self.refresh().await;
        result
    }

    /// Fetch the worker join command, optionally scoped to one server.
    pub async fn fetch_join_command(
        &self,
        server_id: Option<&ServerId>,
    ) -> Result<JoinCommand, ActionError> {
        self.fetch_join_command_with(&JoinCommandRequest::for_server(server_id.cloned()))
            .await
    }

    /// Like [`fetch_join_command`](Self::fetch_join_command) with every query option.
    pub async fn fetch_join_command_with(
        &self,
        request: &JoinCommandRequest,
    ) -> Result<JoinCommand, ActionError> {
        let result = self.source.join_command(request).await;
        self.finish("fetch_join_command", request.server_id.as_ref(), result)
    }

    /// Log and count an action outcome and convert its error.
    fn finish<T>(
        &self,
        action: &'static str,
        id: Option<&ServerId>,
        result: Result<T, ApiError>,
    ) -> Result<T, ActionError> {
        match result {
            Ok(value) => {
                tracing::debug!(action, server_id = ?id.map(ServerId::as_str), "Action succeeded");
                self.count(action, "ok");
                Ok(value)
            }
            Err(e) => {
                let e = ActionError::from(e);
                tracing::warn!(
                    action,
                    server_id = ?id.map(ServerId::as_str),
                    error = %e,
                    "Action failed"
                );
                self.count(action, e.outcome_label());
                Err(e)
            }
        }
    }

    fn count(&self, action: &'static str, outcome: &'static str) {
        metrics::counter!(crate::metrics::ACTIONS_TOTAL, "action" => action, "outcome" => outcome)
            .increment(1);
    }
}
