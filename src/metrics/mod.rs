//! Prometheus export of the console's counters.
//!
//! Counters are recorded through the `metrics` facade everywhere; nothing is
//! kept unless a recorder is installed. `fleet watch` installs the exporter
//! when `metrics.listen` is set, and embedders may install their own.
//!
//! **Counters:**
//! - `fleet_registry_refresh_total{outcome}` - registry fetches (ok, error)
//! - `fleet_actions_total{action, outcome}` - operator actions
//! - `fleet_image_analyze_total{outcome}` - image analysis requests

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub const REGISTRY_REFRESH_TOTAL: &str = "fleet_registry_refresh_total";
pub const ACTIONS_TOTAL: &str = "fleet_actions_total";
pub const IMAGE_ANALYZE_TOTAL: &str = "fleet_image_analyze_total";

/// Register help text for every counter with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(REGISTRY_REFRESH_TOTAL, "Registry fetches by outcome");
    metrics::describe_counter!(ACTIONS_TOTAL, "Operator actions by action and outcome");
    metrics::describe_counter!(IMAGE_ANALYZE_TOTAL, "Image analysis requests by outcome");
}

/// Install the global Prometheus recorder with a scrape listener on `addr`.
///
/// Must be called from within a tokio runtime, at most once per process.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(%addr, "Prometheus metrics listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::server;
    use crate::api::{ApiError, ServerStatus};
    use crate::registry::ServerRegistry;

    #[test]
    fn test_registry_refreshes_are_counted() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let registry = ServerRegistry::new();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            registry.apply(Ok(vec![server("a", ServerStatus::Online)]));
            registry.apply(Err(ApiError::Timeout(10_000)));
            registry.apply(Ok(vec![]));
        });

        let rendered = handle.render();
        assert!(rendered.contains("fleet_registry_refresh_total{outcome=\"ok\"} 2"));
        assert!(rendered.contains("fleet_registry_refresh_total{outcome=\"error\"} 1"));
        assert!(rendered.contains("# HELP fleet_registry_refresh_total"));
    }
}
