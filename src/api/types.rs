//! Wire types for the fleet API.
//!
//! Decoding is lenient where the backend is loose: ids may arrive as numbers
//! or strings, unrecognised statuses collapse to [`ServerStatus::Unknown`],
//! and `null` collections decode as empty.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, stable identifier of a compute server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ServerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ServerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(ServerId)
    }
}

/// Reachability of a compute server as last reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Online,
    Offline,
    Error,
    #[default]
    Unknown,
}

impl From<&str> for ServerStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "online" => ServerStatus::Online,
            "offline" => ServerStatus::Offline,
            "error" => ServerStatus::Error,
            _ => ServerStatus::Unknown,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServerStatus::Online => "online",
            ServerStatus::Offline => "offline",
            ServerStatus::Error => "error",
            ServerStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for ServerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => ServerStatus::from(s.as_str()),
            _ => ServerStatus::Unknown,
        })
    }
}

/// A compute server as returned by `GET /servers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub status: ServerStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default = "default_enabled", deserialize_with = "null_as_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models_available: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub worker_count: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_health_check: Option<DateTime<Utc>>,
}

impl Server {
    pub fn is_online(&self) -> bool {
        self.status == ServerStatus::Online
    }

    /// Capabilities flagged true, in name order.
    pub fn active_capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
    }

    /// A server with attached workers must not be deleted.
    pub fn can_delete(&self) -> bool {
        self.worker_count == 0
    }

    /// Operator-facing reason a delete is blocked, if it is.
    pub fn delete_blocked_reason(&self) -> Option<String> {
        (!self.can_delete()).then(|| {
            format!(
                "Cannot delete server with {} active worker(s). Stop workers first.",
                self.worker_count
            )
        })
    }
}

/// Body of `GET /servers`.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerList {
    pub servers: Vec<Server>,
}

/// Body of `POST /servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewServer {
    pub name: String,
    pub url: String,
    pub priority: u8,
}

/// Reply of `POST /servers/{id}/test`. The body is optional, so every
/// field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeOutcome {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply of `POST /servers/test-all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeSummary {
    #[serde(default)]
    pub online: usize,
    #[serde(default)]
    pub total: usize,
}

/// Accepted model pull. Completion is never tracked client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullJob {
    #[serde(deserialize_with = "string_or_number")]
    pub job_id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Query for `GET /workers/command`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinCommandRequest {
    pub server_id: Option<ServerId>,
    pub worker_name: Option<String>,
}

impl JoinCommandRequest {
    pub fn for_server(server_id: Option<ServerId>) -> Self {
        Self {
            server_id,
            worker_name: None,
        }
    }
}

/// Shell command that attaches a new machine as a worker, plus advisory notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCommand {
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<String>,
}

/// Error body of the fleet API (`{"detail": ...}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Validation errors carry structured details; everything else is a string.
    pub fn into_detail(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn null_as_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

/// Accepts RFC 3339 and the backend's naive ISO timestamps (read as UTC).
/// Anything unparseable is dropped rather than failing the whole list.
pub(crate) fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}
