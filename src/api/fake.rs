//! Scripted in-memory [`ServerSource`] for unit tests.

use super::{
    ApiError, JoinCommand, JoinCommandRequest, NewServer, ProbeOutcome, ProbeSummary, PullJob,
    Server, ServerId, ServerSource, ServerStatus,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Every call the fake received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(NewServer),
    Test(ServerId),
    TestAll,
    Delete(ServerId),
    Pull(ServerId, String),
    JoinCommand(Option<ServerId>),
}

/// Records calls and replays queued results. Unqueued calls succeed.
#[derive(Default)]
pub struct FakeSource {
    calls: Mutex<Vec<Call>>,
    lists: Mutex<VecDeque<Result<Vec<Server>, ApiError>>>,
    servers: Mutex<Vec<Server>>,
    failures: Mutex<BTreeMap<&'static str, VecDeque<ApiError>>>,
    gates: Mutex<BTreeMap<&'static str, Arc<Semaphore>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fleet returned by `list_servers` once the queue is drained.
    pub fn with_servers(servers: Vec<Server>) -> Self {
        let fake = Self::default();
        *fake.servers.lock().unwrap() = servers;
        fake
    }

    pub fn set_servers(&self, servers: Vec<Server>) {
        *self.servers.lock().unwrap() = servers;
    }

    /// Queue one `list_servers` result ahead of the standing fleet.
    pub fn push_list(&self, result: Result<Vec<Server>, ApiError>) {
        self.lists.lock().unwrap().push_back(result);
    }

    /// Make the next call of `method` fail with `error`.
    /// Methods: "create", "test", "test_all", "delete", "pull", "join".
    pub fn fail_next(&self, method: &'static str, error: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(error);
    }

    /// Hold calls of `method` until permits are added to the returned gate.
    /// Methods as for [`fail_next`](Self::fail_next).
    pub fn gate(&self, method: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(method, Arc::clone(&gate));
        gate
    }

    pub fn gate_tests(&self) -> Arc<Semaphore> {
        self.gate("test")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::List))
    }

    /// Number of calls other than `list_servers`.
    pub fn action_calls(&self) -> usize {
        self.count(|c| !matches!(c, Call::List))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait(&self, method: &'static str) {
        let gate = self.gates.lock().unwrap().get(method).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn failure(&self, method: &'static str) -> Result<(), ApiError> {
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Server fixture with sensible defaults.
pub fn server(id: &str, status: ServerStatus) -> Server {
    Server {
        id: ServerId::from(id),
        name: format!("server-{}", id),
        url: format!("http://{}.lan:11434", id),
        status,
        status_message: None,
        enabled: true,
        priority: 0,
        capabilities: BTreeMap::new(),
        models_available: vec![],
        worker_count: 0,
        last_health_check: None,
    }
}

/// Server fixture with attached workers.
pub fn server_with_workers(id: &str, workers: u32) -> Server {
    Server {
        worker_count: workers,
        ..server(id, ServerStatus::Online)
    }
}

pub fn rejected(detail: &str) -> ApiError {
    ApiError::Rejected {
        status: 400,
        detail: detail.to_string(),
    }
}

#[async_trait]
impl ServerSource for FakeSource {
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        self.record(Call::List);
        if let Some(result) = self.lists.lock().unwrap().pop_front() {
            return result;
        }
        Ok(self.servers.lock().unwrap().clone())
    }

    async fn create_server(&self, new: &NewServer) -> Result<Server, ApiError> {
        self.record(Call::Create(new.clone()));
        self.failure("create")?;
        let mut created = server(&format!("{}-id", new.name), ServerStatus::Unknown);
        created.name = new.name.clone();
        created.url = new.url.clone();
        created.priority = i32::from(new.priority);
        self.servers.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn test_server(&self, id: &ServerId) -> Result<ProbeOutcome, ApiError> {
        self.record(Call::Test(id.clone()));
        self.wait("test").await;
        self.failure("test")?;
        Ok(ProbeOutcome {
            connected: true,
            error: None,
        })
    }

    async fn test_all(&self) -> Result<ProbeSummary, ApiError> {
        self.record(Call::TestAll);
        self.wait("test_all").await;
        self.failure("test_all")?;
        let servers = self.servers.lock().unwrap();
        Ok(ProbeSummary {
            online: servers.iter().filter(|s| s.is_online()).count(),
            total: servers.len(),
        })
    }

    async fn delete_server(&self, id: &ServerId) -> Result<(), ApiError> {
        self.record(Call::Delete(id.clone()));
        self.wait("delete").await;
        self.failure("delete")?;
        self.servers.lock().unwrap().retain(|s| &s.id != id);
        Ok(())
    }

    async fn pull_model(&self, id: &ServerId, model: &str) -> Result<PullJob, ApiError> {
        self.record(Call::Pull(id.clone(), model.to_string()));
        self.wait("pull").await;
        self.failure("pull")?;
        Ok(PullJob {
            job_id: format!("job-{}", self.count(|c| matches!(c, Call::Pull(..)))),
            model: Some(model.to_string()),
            server: Some(id.to_string()),
            status: Some("started".to_string()),
        })
    }

    async fn join_command(&self, request: &JoinCommandRequest) -> Result<JoinCommand, ApiError> {
        self.record(Call::JoinCommand(request.server_id.clone()));
        self.failure("join")?;
        Ok(JoinCommand {
            command: "docker run -d --name archive-worker ghcr.io/example/worker:latest"
                .to_string(),
            notes: vec!["Replace <YOUR_HOST> with your server's IP or hostname".to_string()],
        })
    }
}
