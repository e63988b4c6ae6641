//! Shared helpers for fleet console integration tests.

#![allow(dead_code)]

use fleet::api::HttpSource;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Source pointed at a mock server, with a short timeout.
pub fn source_for(server: &MockServer) -> HttpSource {
    HttpSource::with_client(
        &server.uri(),
        reqwest::Client::new(),
        Duration::from_secs(2),
    )
}

/// A server record in the backend's wire shape.
pub fn server_json(id: u64, status: &str, workers: u32) -> Value {
    json!({
        "id": id,
        "name": format!("node-{}", id),
        "url": format!("http://10.0.0.{}:11434", id),
        "status": status,
        "status_message": null,
        "enabled": true,
        "priority": 0,
        "capabilities": {"chat": true, "vision": false},
        "models_available": ["llama3.2:3b"],
        "worker_count": workers,
        "last_health_check": "2024-05-01T12:00:00",
        "provider_type": "ollama",
        "gpu_info": null
    })
}

/// Mount `GET /servers` returning `servers`.
pub async fn mount_servers(server: &MockServer, servers: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "servers": servers })))
        .mount(server)
        .await;
}

/// Error reply in the backend's `{detail}` shape.
pub fn detail(status: u16, text: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": text }))
}

/// Number of requests the mock server saw for `verb path`.
pub async fn hits(server: &MockServer, verb: &str, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .count()
}
