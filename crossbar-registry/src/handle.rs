//! Local and remote service handles

use crossbar_core::{Capability, CapabilitySource, DiscoveredService, Health, Service};
use std::sync::Arc;
use tracing::{debug, warn};

/// A capability-queryable handle returned by discovery.
///
/// Local and remote entries share one capability-query surface; only
/// `health()` differs behaviorally (in-process check vs. a per-call HTTP
/// request). Invoking a remote service's other capabilities is the
/// caller's concern, over whatever RPC the service speaks.
pub enum ServiceHandle {
    /// An in-process service owned by this registry's process
    Local(Arc<dyn Service>),
    /// A read-only proxy for a service learned from a discovery endpoint
    Remote(RemoteService),
}

impl ServiceHandle {
    /// Stable identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Local(service) => service.id(),
            Self::Remote(remote) => &remote.descriptor.id,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Local(service) => service.name(),
            Self::Remote(remote) => &remote.descriptor.name,
        }
    }

    /// Type tag.
    pub fn service_type(&self) -> &str {
        match self {
            Self::Local(service) => service.service_type(),
            Self::Remote(remote) => &remote.descriptor.service_type,
        }
    }

    /// Advertised capabilities.
    pub fn capabilities(&self) -> Vec<Capability> {
        match self {
            Self::Local(service) => service.capabilities(),
            Self::Remote(remote) => remote.descriptor.capabilities.clone(),
        }
    }

    /// Whether this handle proxies a remote entry.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Compute a fresh health report.
    ///
    /// A failing local check or an unreachable remote both degrade to an
    /// offline report carrying the error; this never propagates.
    pub async fn health(&self) -> Health {
        match self {
            Self::Local(service) => match service.health().await {
                Ok(health) => health,
                Err(e) => {
                    warn!(service_id = service.id(), error = %e, "Local health check failed");
                    Health::offline(e.to_string())
                }
            },
            Self::Remote(remote) => remote.health().await,
        }
    }
}

impl CapabilitySource for ServiceHandle {
    fn source_id(&self) -> &str {
        self.id()
    }

    fn capability_set(&self) -> Vec<Capability> {
        self.capabilities()
    }
}

/// Read-only proxy for a service discovered on a remote node.
///
/// Health is resolved per call with a fresh request to
/// `{discovery_endpoint}/{id}/health`; nothing is cached here.
pub struct RemoteService {
    /// The descriptor captured at discovery time
    pub descriptor: DiscoveredService,

    /// The discovery endpoint this entry came from
    pub discovery_endpoint: String,

    client: reqwest::Client,
    health_timeout: std::time::Duration,
}

impl RemoteService {
    /// Wrap a discovered entry as a proxy.
    pub fn new(
        descriptor: DiscoveredService,
        discovery_endpoint: impl Into<String>,
        client: reqwest::Client,
        health_timeout: std::time::Duration,
    ) -> Self {
        Self {
            descriptor,
            discovery_endpoint: discovery_endpoint.into(),
            client,
            health_timeout,
        }
    }

    /// Issue a fresh health request for this service.
    pub async fn health(&self) -> Health {
        let url = format!(
            "{}/{}/health",
            self.discovery_endpoint.trim_end_matches('/'),
            self.descriptor.id
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<Health>().await {
                    Ok(health) => {
                        debug!(service_id = %self.descriptor.id, status = ?health.status, "Remote health check");
                        health
                    }
                    Err(e) => {
                        warn!(service_id = %self.descriptor.id, error = %e, "Unparseable health payload");
                        Health::offline(format!("invalid health payload: {}", e))
                    }
                }
            }
            Ok(response) => {
                warn!(
                    service_id = %self.descriptor.id,
                    status = %response.status(),
                    "Remote health check returned non-success"
                );
                Health::offline(format!("health endpoint returned {}", response.status()))
            }
            Err(e) => {
                warn!(service_id = %self.descriptor.id, error = %e, "Remote health check failed");
                Health::offline(e.to_string())
            }
        }
    }
}
