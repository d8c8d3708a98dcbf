//! Process-local service registry

use crate::config::RegistryConfig;
use crate::handle::{RemoteService, ServiceHandle};
use chrono::{DateTime, Utc};
use crossbar_core::{
    DiscoveryPayload, Health, Service, ServiceChange, ServiceChangeEvent,
    capabilities_match_term,
};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

type ChangeListener = Arc<dyn Fn(&ServiceChangeEvent) + Send + Sync>;

/// Where a discovery result was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    /// No remote endpoints are configured; local table only
    Local,
    /// At least one remote endpoint was queried
    Remote,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// The outcome of one [`ServiceRegistry::discover`] call.
///
/// `discover` always resolves: per-endpoint failures land in `errors`
/// and the local table is always present in `services`.
pub struct DiscoveryResult {
    /// Local services plus deduplicated remote proxies
    pub services: Vec<ServiceHandle>,

    /// When the result was assembled
    pub timestamp: DateTime<Utc>,

    /// `Local` iff zero endpoints are configured
    pub source: DiscoverySource,

    /// One entry per failed endpoint
    pub errors: Vec<String>,
}

/// Process-local source of truth for services and their health.
///
/// Table operations (`register`, `unregister`, `get*`) are synchronous
/// and never suspend; `discover`, `health_status`, and `shutdown` may
/// suspend at the network boundary. One instance is typically shared per
/// process via [`shared`](crate::shared::shared), with
/// [`reset_shared`](crate::shared::reset_shared) for test isolation.
pub struct ServiceRegistry {
    config: RegistryConfig,
    services: DashMap<String, Arc<dyn Service>>,
    health_cache: DashMap<String, Health>,
    listeners: Arc<DashMap<u64, ChangeListener>>,
    next_listener_id: AtomicU64,
    http: reqwest::Client,
}

impl ServiceRegistry {
    /// Create a registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.discovery_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            services: DashMap::new(),
            health_cache: DashMap::new(),
            listeners: Arc::new(DashMap::new()),
            next_listener_id: AtomicU64::new(0),
            http,
        }
    }

    /// Create a registry with the default configuration (no endpoints).
    pub fn with_defaults() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// Insert or replace a service by id.
    ///
    /// Re-registering an existing id is an update, never a duplicate:
    /// listeners see `Updated` instead of `Registered`.
    pub fn register(&self, service: Arc<dyn Service>) {
        let id = service.id().to_string();
        let replaced = self.services.insert(id.clone(), service).is_some();

        let change = if replaced {
            ServiceChange::Updated
        } else {
            ServiceChange::Registered
        };
        info!(service_id = %id, updated = replaced, "Service registered");
        self.emit(ServiceChangeEvent::new(id, change));
    }

    /// Remove a service and its cached health.
    ///
    /// Unregistering an unknown id is a no-op: no event, no error.
    pub fn unregister(&self, id: &str) -> bool {
        if self.services.remove(id).is_none() {
            return false;
        }
        self.health_cache.remove(id);

        info!(service_id = %id, "Service unregistered");
        self.emit(ServiceChangeEvent::new(id, ServiceChange::Unregistered));
        true
    }

    /// Look up a service by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Service>> {
        self.services.get(id).map(|entry| entry.value().clone())
    }

    /// All services carrying the given type tag.
    pub fn get_by_type(&self, service_type: &str) -> Vec<Arc<dyn Service>> {
        self.services
            .iter()
            .filter(|entry| entry.value().service_type() == service_type)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All services matching a capability name or feature tag.
    ///
    /// Unscored; the term semantics mirror the matcher's exactly.
    pub fn get_by_capability(&self, term: &str) -> Vec<Arc<dyn Service>> {
        self.services
            .iter()
            .filter(|entry| capabilities_match_term(&entry.value().capabilities(), term))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of locally registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the local table is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Subscribe to change events. Drop the subscription's handle via
    /// [`ChangeSubscription::unsubscribe`] to stop receiving them.
    pub fn on_service_change<F>(&self, listener: F) -> ChangeSubscription
    where
        F: Fn(&ServiceChangeEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.insert(id, Arc::new(listener));
        ChangeSubscription {
            id,
            listeners: self.listeners.clone(),
        }
    }

    /// Merge the local table with every configured remote endpoint.
    ///
    /// Remote entries not shadowed by a local id are wrapped as read-only
    /// proxies whose health is resolved per call. Endpoint failures
    /// accumulate in `errors`; this never rejects.
    pub async fn discover(&self) -> DiscoveryResult {
        let timestamp = Utc::now();
        let mut services: Vec<ServiceHandle> = self
            .services
            .iter()
            .map(|entry| ServiceHandle::Local(entry.value().clone()))
            .collect();

        if self.config.discovery_endpoints.is_empty() {
            debug!(locals = services.len(), "Discovery with no remote endpoints");
            return DiscoveryResult {
                services,
                timestamp,
                source: DiscoverySource::Local,
                errors: Vec::new(),
            };
        }

        let local_ids: HashSet<String> =
            services.iter().map(|h| h.id().to_string()).collect();

        let fetches = self
            .config
            .discovery_endpoints
            .iter()
            .map(|endpoint| self.fetch_endpoint(endpoint));
        let results = join_all(fetches).await;

        let mut errors = Vec::new();
        let mut seen_remote = HashSet::new();
        for (endpoint, result) in self.config.discovery_endpoints.iter().zip(results) {
            match result {
                Ok(descriptors) => {
                    for descriptor in descriptors {
                        if local_ids.contains(&descriptor.id)
                            || !seen_remote.insert(descriptor.id.clone())
                        {
                            continue;
                        }
                        services.push(ServiceHandle::Remote(RemoteService::new(
                            descriptor,
                            endpoint.clone(),
                            self.http.clone(),
                            self.config.health_timeout,
                        )));
                    }
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Discovery endpoint failed");
                    errors.push(format!("{}: {}", endpoint, e));
                }
            }
        }

        info!(
            total = services.len(),
            failed_endpoints = errors.len(),
            "Discovery complete"
        );
        DiscoveryResult {
            services,
            timestamp,
            source: DiscoverySource::Remote,
            errors,
        }
    }

    /// Check every local service's health concurrently.
    ///
    /// A throwing check becomes a synthetic offline report. Status
    /// transitions against the cached value emit `HealthChanged` before
    /// this returns; the cache is trusted only until the next cycle.
    pub async fn health_status(&self) -> HashMap<String, Health> {
        let snapshot: Vec<(String, Arc<dyn Service>)> = self
            .services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let checks = snapshot.into_iter().map(|(id, service)| async move {
            let health = match service.health().await {
                Ok(health) => health,
                Err(e) => {
                    warn!(service_id = %id, error = %e, "Health check failed");
                    Health::offline(e.to_string())
                }
            };
            (id, health)
        });

        let mut statuses = HashMap::new();
        for (id, health) in join_all(checks).await {
            let previous = self.health_cache.insert(id.clone(), health.clone());
            if let Some(prev) = previous
                && prev.status != health.status
            {
                self.emit(ServiceChangeEvent::new(
                    id.clone(),
                    ServiceChange::HealthChanged {
                        previous: Some(prev),
                        current: health.clone(),
                    },
                ));
            }
            statuses.insert(id, health);
        }
        statuses
    }

    /// Shut down every local service (best-effort, concurrently), then
    /// clear the table, the health cache, and all listeners.
    pub async fn shutdown(&self) {
        let snapshot: Vec<Arc<dyn Service>> = self
            .services
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let shutdowns = snapshot.into_iter().map(|service| async move {
            if let Err(e) = service.shutdown().await {
                warn!(service_id = service.id(), error = %e, "Service shutdown failed");
            }
        });
        join_all(shutdowns).await;

        self.services.clear();
        self.health_cache.clear();
        self.listeners.clear();
        info!("Registry shut down");
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Vec<crossbar_core::DiscoveredService>, crate::RegistryError> {
        let response = self
            .http
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::RegistryError::EndpointStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Malformed bodies degrade to zero services rather than failing
        // the endpoint.
        match response.json::<DiscoveryPayload>().await {
            Ok(payload) => Ok(payload
                .into_descriptors()
                .into_iter()
                .map(|d| d.into_discovered(endpoint))
                .collect()),
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Unparseable discovery payload");
                Ok(Vec::new())
            }
        }
    }

    /// Synchronous fan-out; each listener is isolated from the others.
    fn emit(&self, event: ServiceChangeEvent) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!(service_id = %event.service_id, "Change listener panicked");
            }
        }
    }
}

/// Handle returned by [`ServiceRegistry::on_service_change`].
pub struct ChangeSubscription {
    id: u64,
    listeners: Arc<DashMap<u64, ChangeListener>>,
}

impl ChangeSubscription {
    /// Stop receiving change events.
    pub fn unsubscribe(self) {
        self.listeners.remove(&self.id);
    }
}
