//! Metrics export settings

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Prometheus scrape endpoint for `fleet watch`. Off unless `listen` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_disabled_by_default() {
        assert!(MetricsConfig::default().listen.is_none());
    }

    #[test]
    fn test_metrics_listen_parses() {
        let config: MetricsConfig = toml::from_str("listen = \"127.0.0.1:9464\"").unwrap();
        assert_eq!(config.listen, Some("127.0.0.1:9464".parse().unwrap()));
    }
}
