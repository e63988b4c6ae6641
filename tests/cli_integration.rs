//! CLI integration tests using assert_cmd.

mod common;

use assert_cmd::Command;
use common::{detail, mount_servers, server_json};
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fleet_cmd() -> Command {
    let mut cmd = Command::cargo_bin("fleet").unwrap();
    cmd.env_remove("FLEET_API_URL")
        .env_remove("FLEET_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || fleet_cmd().args(args).assert())
        .await
        .unwrap()
}

fn args(api: &str, rest: &[&str]) -> Vec<String> {
    let mut all = vec!["--api-url".to_string(), api.to_string()];
    all.extend(rest.iter().map(|s| s.to_string()));
    all
}

#[test]
fn test_version_output() {
    fleet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleet"));
}

#[test]
fn test_help_shows_all_commands() {
    fleet_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("servers"))
        .stdout(predicate::str::contains("workers"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("images"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_servers_help() {
    fleet_cmd()
        .args(["servers", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("test-all"))
        .stdout(predicate::str::contains("pull"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fleet.toml");

    fleet_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[polling]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fleet.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    fleet_cmd()
        .args(["config", "init", "-o", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_missing_config_file_fails() {
    fleet_cmd()
        .args(["--config", "/nonexistent/fleet.toml", "servers", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_completions_bash() {
    fleet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fleet"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_servers_list_table() {
    let mock = MockServer::start().await;
    mount_servers(
        &mock,
        vec![server_json(1, "online", 0), server_json(2, "offline", 1)],
    )
    .await;

    run(args(&mock.uri(), &["servers", "list"]))
        .await
        .success()
        .stdout(predicate::str::contains("1/2 online"))
        .stdout(predicate::str::contains("node-1"))
        .stdout(predicate::str::contains("node-2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_servers_list_json() {
    let mock = MockServer::start().await;
    mount_servers(&mock, vec![server_json(5, "error", 0)]).await;

    let assert = run(args(&mock.uri(), &["servers", "list", "--json"]))
        .await
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total"], 1);
    assert_eq!(value["online"], 0);
    assert_eq!(value["servers"][0]["id"], "5");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_servers_remove_blocked_by_workers() {
    let mock = MockServer::start().await;
    mount_servers(&mock, vec![server_json(3, "online", 2)]).await;
    Mock::given(method("DELETE"))
        .and(path("/servers/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock)
        .await;

    run(args(&mock.uri(), &["servers", "remove", "3"]))
        .await
        .failure()
        .stderr(predicate::str::contains(
            "Cannot delete server with 2 active worker(s). Stop workers first.",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_servers_add_validation_makes_no_call() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock)
        .await;

    run(args(
        &mock.uri(),
        &["servers", "add", "oak", "http://10.0.0.5:11434", "-p", "101"],
    ))
    .await
    .failure()
    .stderr(predicate::str::contains("Priority must be between 0 and 100"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_servers_pull_rejection_is_reported() {
    let mock = MockServer::start().await;
    mount_servers(&mock, vec![]).await;
    Mock::given(method("POST"))
        .and(path("/servers/9/pull-model"))
        .respond_with(detail(404, "Server not found"))
        .mount(&mock)
        .await;

    run(args(&mock.uri(), &["servers", "pull", "9", "llama3.2:3b"]))
        .await
        .failure()
        .stderr(predicate::str::contains("Error: Server not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_workers_command_raw() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workers/command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "command": "docker run -d fleet-worker",
            "notes": ["Requires Docker"]
        })))
        .mount(&mock)
        .await;

    run(args(&mock.uri(), &["workers", "command", "--raw"]))
        .await
        .success()
        .stdout(predicate::str::contains("docker run -d fleet-worker"))
        .stdout(predicate::str::contains("Requires Docker").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_fails_cleanly() {
    let mock = MockServer::start().await;
    let uri = mock.uri();
    drop(mock);

    run(args(&uri, &["servers", "list"]))
        .await
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
