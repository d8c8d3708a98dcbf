//! Registry configuration

use std::env;
use std::time::Duration;
use tracing::debug;

const ENDPOINTS_VAR: &str = "CROSSBAR_DISCOVERY_ENDPOINTS";
const REMOTE_HOST_VAR: &str = "CROSSBAR_REMOTE_AGENT_HOST";
const REMOTE_PORT_VAR: &str = "CROSSBAR_REMOTE_AGENT_PORT";

/// Default port for a remote agent when only a host is configured.
const DEFAULT_REMOTE_PORT: u16 = 7400;

/// Configuration for a [`ServiceRegistry`](crate::ServiceRegistry).
///
/// Discovery endpoints are policy-derived: an operator-supplied list, or
/// one endpoint synthesized from a remote-agent address. The registry
/// itself only requires a list of HTTP base URLs.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Remote discovery endpoint base URLs
    pub discovery_endpoints: Vec<String>,

    /// Timeout for each discovery endpoint request
    pub discovery_timeout: Duration,

    /// Timeout for each remote-proxy health request
    pub health_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            discovery_endpoints: Vec::new(),
            discovery_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
        }
    }
}

impl RegistryConfig {
    /// Create a config with no remote endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovery endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.discovery_endpoints.push(endpoint.into());
        self
    }

    /// Set the per-endpoint discovery timeout.
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the remote-proxy health check timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Build a config from `CROSSBAR_`-prefixed environment variables.
    ///
    /// `CROSSBAR_DISCOVERY_ENDPOINTS` is a comma-separated URL list.
    /// When it is absent, `CROSSBAR_REMOTE_AGENT_HOST` (with optional
    /// `CROSSBAR_REMOTE_AGENT_PORT`) synthesizes a single default
    /// endpoint.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(list) = env::var(ENDPOINTS_VAR) {
            config.discovery_endpoints = parse_endpoint_list(&list);
        } else if let Ok(host) = env::var(REMOTE_HOST_VAR) {
            let port = env::var(REMOTE_PORT_VAR)
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_REMOTE_PORT);
            config
                .discovery_endpoints
                .push(format!("http://{}:{}/services/discover", host, port));
        }

        debug!(
            endpoints = config.discovery_endpoints.len(),
            "Loaded registry config from environment"
        );
        config
    }
}

/// Split a comma-separated endpoint list, dropping empty entries.
pub fn parse_endpoint_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
