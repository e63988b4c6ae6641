use super::*;
use crate::api::fake::{server, FakeSource};
use crate::api::ServerStatus;

fn fleet(statuses: &[ServerStatus]) -> Vec<Server> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| server(&format!("s{}", i), *status))
        .collect()
}

#[test]
fn test_initial_state_is_loading_not_empty() {
    let registry = ServerRegistry::new();
    let view = registry.view();

    assert!(view.is_loading());
    assert!(view.servers().is_empty());
    assert!(!view.has_error());
    assert_eq!(view.generation, 0);
}

#[test]
fn test_empty_fleet_is_ready() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(vec![]));

    let view = registry.view();
    assert!(!view.is_loading());
    assert_eq!(view.total_count(), 0);
    assert_eq!(view.generation, 1);
}

#[test]
fn test_success_replaces_wholesale() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(fleet(&[ServerStatus::Online, ServerStatus::Offline])));

    let mut replacement = server("s1", ServerStatus::Online);
    replacement.name = "renamed".to_string();
    registry.apply(Ok(vec![replacement]));

    let view = registry.view();
    assert_eq!(view.total_count(), 1);
    assert_eq!(view.servers()[0].name, "renamed");
    assert!(view.get(&"s0".into()).is_none());
    assert_eq!(view.generation, 2);
}

#[test]
fn test_order_follows_source() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(fleet(&[
        ServerStatus::Offline,
        ServerStatus::Online,
        ServerStatus::Error,
    ])));

    let ids: Vec<_> = registry
        .view()
        .servers()
        .iter()
        .map(|s| s.id.to_string())
        .collect();
    assert_eq!(ids, vec!["s0", "s1", "s2"]);
}

#[test]
fn test_failure_keeps_snapshot_and_flags_error() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(fleet(&[ServerStatus::Online, ServerStatus::Online])));
    let before = registry.view();

    let outcome = registry.apply(Err(ApiError::Network("connection refused".into())));
    assert!(matches!(outcome, RefreshOutcome::Failed(ref m) if m.contains("connection refused")));

    let after = registry.view();
    assert!(after.has_error());
    assert_eq!(after.online_count(), before.online_count());
    assert_eq!(after.servers(), before.servers());
    assert_eq!(after.generation, before.generation);
}

#[test]
fn test_next_success_clears_error() {
    let registry = ServerRegistry::new();
    registry.apply(Err(ApiError::Timeout(5000)));
    assert!(registry.view().has_error());
    assert!(registry.view().is_loading());

    registry.apply(Ok(fleet(&[ServerStatus::Online])));
    assert!(!registry.view().has_error());
    assert_eq!(registry.view().online_count(), 1);
}

#[test]
fn test_malformed_response_is_a_failure() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(fleet(&[ServerStatus::Online])));
    registry.apply(Err(ApiError::InvalidResponse("missing field `servers`".into())));

    assert_eq!(registry.view().total_count(), 1);
    assert!(registry.view().has_error());
}

#[test]
fn test_closed_registry_discards_writes() {
    let registry = ServerRegistry::new();
    registry.apply(Ok(fleet(&[ServerStatus::Online])));
    registry.close();
    registry.close();

    assert_eq!(
        registry.apply(Ok(vec![])),
        RefreshOutcome::Discarded
    );
    assert_eq!(
        registry.apply(Err(ApiError::Timeout(1))),
        RefreshOutcome::Discarded
    );
    assert_eq!(registry.view().total_count(), 1);
    assert!(!registry.view().has_error());

    registry.reopen();
    registry.apply(Ok(vec![]));
    assert_eq!(registry.view().total_count(), 0);
}

#[test]
fn test_subscribers_see_whole_snapshots() {
    let registry = ServerRegistry::new();
    let mut rx = registry.subscribe();

    registry.apply(Ok(fleet(&[ServerStatus::Online, ServerStatus::Offline])));
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.total_count(), 2);
    assert_eq!(seen.online_count(), 1);
}

#[tokio::test]
async fn test_refresh_reads_from_source() {
    let source = FakeSource::with_servers(fleet(&[ServerStatus::Online, ServerStatus::Error]));
    let registry = ServerRegistry::new();

    let outcome = registry.refresh(&source).await;

    assert_eq!(outcome, RefreshOutcome::Replaced(2));
    assert_eq!(source.list_calls(), 1);
    assert_eq!(registry.view().online_count(), 1);
}

#[tokio::test]
async fn test_refresh_failure_from_source() {
    let source = FakeSource::new();
    source.push_list(Err(ApiError::Rejected {
        status: 500,
        detail: "database unavailable".into(),
    }));
    let registry = ServerRegistry::new();

    registry.refresh(&source).await;

    assert!(registry.view().is_loading());
    assert_eq!(registry.view().error.as_deref(), Some("database unavailable"));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = ServerStatus> {
        prop_oneof![
            Just(ServerStatus::Online),
            Just(ServerStatus::Offline),
            Just(ServerStatus::Error),
            Just(ServerStatus::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn prop_online_count_matches_last_snapshot(
            refreshes in proptest::collection::vec(
                proptest::option::of(proptest::collection::vec(status_strategy(), 0..20)),
                1..20,
            )
        ) {
            // None = failed refresh, Some = successful snapshot
            let registry = ServerRegistry::new();
            let mut last_applied: Option<Vec<ServerStatus>> = None;

            for refresh in refreshes {
                match refresh {
                    Some(statuses) => {
                        registry.apply(Ok(fleet(&statuses)));
                        last_applied = Some(statuses);
                    }
                    None => {
                        registry.apply(Err(ApiError::Network("down".into())));
                    }
                }

                let view = registry.view();
                match &last_applied {
                    Some(statuses) => {
                        let expected = statuses
                            .iter()
                            .filter(|s| **s == ServerStatus::Online)
                            .count();
                        prop_assert_eq!(view.online_count(), expected);
                        prop_assert_eq!(view.total_count(), statuses.len());
                    }
                    None => prop_assert!(view.is_loading()),
                }
            }
        }
    }
}
