//! The discovery poller

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crossbar_core::{
    DiscoveredService, DiscoveryPayload, HealthStatus, Service, ServiceChange,
    ServiceChangeEvent,
};
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Header identifying this poller to discovery endpoints.
const CLIENT_HEADER: (&str, &str) = ("X-Discovery-Client", "crossbar");

type WatchCallback = Arc<dyn Fn(&[ServiceChangeEvent]) + Send + Sync>;

/// An independent poller over remote discovery endpoints.
///
/// Life-cycle is decoupled from any registry: zero, one, or many
/// instances may run per process. Each cycle queries every endpoint,
/// diffs the combined result against the previous one by id, replaces
/// the internal map wholesale, and hands subscribed watchers the full
/// change batch once.
///
/// Cloning is cheap and shares all state, which is what the auto-refresh
/// task relies on.
#[derive(Clone)]
pub struct ServiceDiscovery {
    endpoints: Arc<Vec<String>>,
    config: Arc<DiscoveryConfig>,
    client: reqwest::Client,
    known: Arc<RwLock<HashMap<String, DiscoveredService>>>,
    watchers: Arc<DashMap<u64, WatchCallback>>,
    next_watcher_id: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

impl ServiceDiscovery {
    /// Create a poller over the given endpoint base URLs.
    pub fn new(endpoints: Vec<String>, config: DiscoveryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoints: Arc::new(endpoints),
            config: Arc::new(config),
            client,
            known: Arc::new(RwLock::new(HashMap::new())),
            watchers: Arc::new(DashMap::new()),
            next_watcher_id: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
        }
    }

    /// Run one poll cycle across all endpoints and return the change
    /// batch (also delivered to watchers when non-empty).
    pub async fn discover_services(&self) -> Vec<ServiceChangeEvent> {
        let fetches = self.endpoints.iter().map(|endpoint| async move {
            (endpoint.clone(), self.discover_from_endpoint(endpoint).await)
        });

        let mut next: HashMap<String, DiscoveredService> = HashMap::new();
        for (endpoint, result) in join_all(fetches).await {
            match result {
                Ok(services) => {
                    for service in services {
                        next.insert(service.id.clone(), service);
                    }
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Endpoint poll failed");
                }
            }
        }

        let changes = self.apply_poll(next);
        if !changes.is_empty() {
            self.notify(&changes);
        }
        changes
    }

    /// One GET against one endpoint, retried with linear backoff.
    ///
    /// Attempt `n` failing waits `retry_delay * n` before the next try;
    /// the final failure is surfaced to the caller, which isolates it
    /// per endpoint.
    pub async fn discover_from_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Vec<DiscoveredService>, DiscoveryError> {
        let attempts = self.config.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(endpoint).await {
                Ok(services) => return Ok(services),
                Err(e) => {
                    warn!(endpoint = %endpoint, attempt, error = %e, "Discovery request failed");
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(DiscoveryError::RetriesExhausted {
            endpoint: endpoint.to_string(),
            attempts,
            last_error,
        })
    }

    /// Best-effort broadcast of one local service's identity to every
    /// endpoint's companion registration path.
    ///
    /// The path is derived by substituting "/discover" with "/register";
    /// endpoints without a "/discover" segment are skipped. Failures are
    /// logged, never returned.
    pub async fn register_local(&self, service: &dyn Service) {
        let body = serde_json::json!({
            "id": service.id(),
            "name": service.name(),
            "type": service.service_type(),
            "capabilities": service.capabilities(),
        });

        for endpoint in self.endpoints.iter() {
            let register_url = endpoint.replace("/discover", "/register");
            if register_url == *endpoint {
                warn!(endpoint = %endpoint, "No /discover segment; skipping registration");
                continue;
            }

            match self.client.post(&register_url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(service_id = service.id(), endpoint = %register_url, "Registered with endpoint");
                }
                Ok(response) => {
                    warn!(
                        service_id = service.id(),
                        endpoint = %register_url,
                        status = %response.status(),
                        "Registration rejected"
                    );
                }
                Err(e) => {
                    warn!(service_id = service.id(), endpoint = %register_url, error = %e, "Registration failed");
                }
            }
        }
    }

    /// Subscribe to change batches. Each callback receives the whole
    /// batch of one cycle once, and a panicking callback is isolated
    /// from the others.
    pub fn watch_for_changes<F>(&self, callback: F) -> WatchSubscription
    where
        F: Fn(&[ServiceChangeEvent]) + Send + Sync + 'static,
    {
        let id = self.next_watcher_id.fetch_add(1, Ordering::SeqCst);
        self.watchers.insert(id, Arc::new(callback));
        WatchSubscription {
            id,
            watchers: self.watchers.clone(),
        }
    }

    /// Start the refresh loop: one immediate poll, then one per
    /// `refresh_interval`. Starting twice is a no-op.
    pub fn start_auto_refresh(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Auto refresh already running");
            return;
        }

        info!(
            interval_secs = self.config.refresh_interval.as_secs(),
            endpoints = self.endpoints.len(),
            "Starting auto refresh"
        );

        let this = self.clone();
        tokio::spawn(async move {
            loop {
                this.discover_services().await;

                // Stop only interrupts the sleep; an in-flight poll
                // always runs to completion.
                tokio::select! {
                    _ = tokio::time::sleep(this.config.refresh_interval) => {}
                    _ = this.stop_signal.notified() => break,
                }
                if !this.running.load(Ordering::SeqCst) {
                    break;
                }
            }
            debug!("Auto refresh loop exited");
        });
    }

    /// Stop scheduling refresh cycles. Stopping twice is a no-op.
    pub fn stop_auto_refresh(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.stop_signal.notify_waiters();
        info!("Auto refresh stopped");
    }

    /// Whether the refresh loop is scheduled.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the last completed poll. Never triggers a poll.
    pub fn discovered_services(&self) -> Vec<DiscoveredService> {
        self.known.read().values().cloned().collect()
    }

    /// One service from the last completed poll.
    pub fn service_by_id(&self, id: &str) -> Option<DiscoveredService> {
        self.known.read().get(id).cloned()
    }

    /// Services from the last poll carrying the given type tag.
    pub fn services_by_type(&self, service_type: &str) -> Vec<DiscoveredService> {
        self.known
            .read()
            .values()
            .filter(|s| s.service_type == service_type)
            .cloned()
            .collect()
    }

    /// Services from the last poll whose status is `Healthy`. Degraded
    /// entries are excluded.
    pub fn healthy_services(&self) -> Vec<DiscoveredService> {
        self.known
            .read()
            .values()
            .filter(|s| s.health.status == HealthStatus::Healthy)
            .cloned()
            .collect()
    }

    async fn fetch_once(
        &self,
        endpoint: &str,
    ) -> Result<Vec<DiscoveredService>, DiscoveryError> {
        let response = self
            .client
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(CLIENT_HEADER.0, CLIENT_HEADER.1)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::EndpointStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        // A body that is neither an array nor {services: [...]} yields
        // zero services, not an error.
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

    /// Diff a poll result against the previous map and replace it
    /// wholesale.
    ///
    /// New id → added; present both times with a health-status
    /// difference → health-changed; missing now → removed. Non-health
    /// field changes emit nothing. Only `discovered_at` survives across
    /// cycles for continuing ids; everything else is the new poll's
    /// data.
    fn apply_poll(&self, mut next: HashMap<String, DiscoveredService>) -> Vec<ServiceChangeEvent> {
        let mut known = self.known.write();
        let mut changes = Vec::new();

        for (id, service) in next.iter_mut() {
            match known.get(id) {
                None => {
                    changes.push(ServiceChangeEvent::new(id.clone(), ServiceChange::Registered));
                }
                Some(previous) => {
                    service.discovered_at = previous.discovered_at;
                    if previous.health.status != service.health.status {
                        changes.push(ServiceChangeEvent::new(
                            id.clone(),
                            ServiceChange::HealthChanged {
                                previous: Some(previous.health.clone()),
                                current: service.health.clone(),
                            },
                        ));
                    }
                }
            }
        }

        for id in known.keys() {
            if !next.contains_key(id) {
                changes.push(ServiceChangeEvent::new(
                    id.clone(),
                    ServiceChange::Unregistered,
                ));
            }
        }

        debug!(
            services = next.len(),
            changes = changes.len(),
            "Poll cycle applied"
        );
        *known = next;
        changes
    }

    fn notify(&self, changes: &[ServiceChangeEvent]) {
        let watchers: Vec<WatchCallback> = self
            .watchers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for watcher in watchers {
            if catch_unwind(AssertUnwindSafe(|| watcher(changes))).is_err() {
                warn!("Change watcher panicked");
            }
        }
    }
}

/// Handle returned by [`ServiceDiscovery::watch_for_changes`].
pub struct WatchSubscription {
    id: u64,
    watchers: Arc<DashMap<u64, WatchCallback>>,
}

impl WatchSubscription {
    /// Stop receiving change batches.
    pub fn unsubscribe(self) {
        self.watchers.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossbar_core::{Capability, Health};

    fn discovered(id: &str, status: HealthStatus) -> DiscoveredService {
        DiscoveredService {
            id: id.to_string(),
            name: id.to_string(),
            service_type: "worker".to_string(),
            endpoint: format!("http://{}:9000", id),
            capabilities: vec![Capability::new("chat", "1.0")],
            health: Health {
                status,
                last_check: Utc::now(),
                error: None,
            },
            metadata: Default::default(),
            discovered_at: Utc::now(),
            last_seen: Utc::now(),
        }
    }

    fn poller() -> ServiceDiscovery {
        ServiceDiscovery::new(Vec::new(), DiscoveryConfig::default())
    }

    fn poll_with(poller: &ServiceDiscovery, services: &[DiscoveredService]) -> Vec<ServiceChangeEvent> {
        let map = services
            .iter()
            .cloned()
            .map(|s| (s.id.clone(), s))
            .collect();
        poller.apply_poll(map)
    }

    #[test]
    fn test_first_poll_adds_everything() {
        let poller = poller();
        let changes = poll_with(
            &poller,
            &[
                discovered("a", HealthStatus::Healthy),
                discovered("b", HealthStatus::Degraded),
            ],
        );

        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.change == ServiceChange::Registered));
        assert_eq!(poller.discovered_services().len(), 2);
    }

    #[test]
    fn test_unchanged_poll_emits_nothing() {
        let poller = poller();
        let services = [discovered("a", HealthStatus::Healthy)];

        poll_with(&poller, &services);
        let changes = poll_with(&poller, &services);

        assert!(changes.is_empty());
    }

    #[test]
    fn test_disappearing_id_emits_one_removal() {
        let poller = poller();
        poll_with(
            &poller,
            &[
                discovered("a", HealthStatus::Healthy),
                discovered("b", HealthStatus::Healthy),
            ],
        );

        let changes = poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].service_id, "b");
        assert_eq!(changes[0].change, ServiceChange::Unregistered);
        assert!(poller.service_by_id("b").is_none());
    }

    #[test]
    fn test_health_flip_carries_previous_and_current() {
        let poller = poller();
        poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);

        let changes = poll_with(&poller, &[discovered("a", HealthStatus::Offline)]);

        assert_eq!(changes.len(), 1);
        match &changes[0].change {
            ServiceChange::HealthChanged { previous, current } => {
                assert_eq!(previous.as_ref().unwrap().status, HealthStatus::Healthy);
                assert_eq!(current.status, HealthStatus::Offline);
            }
            other => panic!("unexpected change: {:?}", other),
        }
    }

    #[test]
    fn test_non_health_changes_emit_nothing() {
        let poller = poller();
        poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);

        let mut renamed = discovered("a", HealthStatus::Healthy);
        renamed.name = "renamed".to_string();
        renamed.capabilities.push(Capability::new("extra", "1.0"));
        let changes = poll_with(&poller, &[renamed]);

        assert!(changes.is_empty());
        // The map is still replaced wholesale.
        assert_eq!(poller.service_by_id("a").unwrap().name, "renamed");
    }

    #[test]
    fn test_first_seen_timestamp_survives_cycles() {
        let poller = poller();
        poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);
        let first_seen = poller.service_by_id("a").unwrap().discovered_at;

        poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);

        assert_eq!(poller.service_by_id("a").unwrap().discovered_at, first_seen);
    }

    #[test]
    fn test_snapshot_accessors() {
        let poller = poller();
        let mut media = discovered("m", HealthStatus::Degraded);
        media.service_type = "media".to_string();
        poll_with(
            &poller,
            &[discovered("a", HealthStatus::Healthy), media],
        );

        assert_eq!(poller.services_by_type("media").len(), 1);
        assert_eq!(poller.healthy_services().len(), 1);
        assert_eq!(poller.healthy_services()[0].id, "a");
        assert!(poller.service_by_id("missing").is_none());
    }

    #[test]
    fn test_watcher_receives_batch_once() {
        let poller = poller();
        let batches: Arc<parking_lot::Mutex<Vec<usize>>> = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = batches.clone();
        let _sub = poller.watch_for_changes(move |changes| sink.lock().push(changes.len()));

        let changes = poll_with(
            &poller,
            &[
                discovered("a", HealthStatus::Healthy),
                discovered("b", HealthStatus::Healthy),
            ],
        );
        if !changes.is_empty() {
            poller.notify(&changes);
        }

        assert_eq!(*batches.lock(), vec![2]);
    }

    #[test]
    fn test_unsubscribed_watcher_is_silent() {
        let poller = poller();
        let batches: Arc<parking_lot::Mutex<Vec<usize>>> = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = batches.clone();
        let sub = poller.watch_for_changes(move |changes| sink.lock().push(changes.len()));
        sub.unsubscribe();

        let changes = poll_with(&poller, &[discovered("a", HealthStatus::Healthy)]);
        poller.notify(&changes);

        assert!(batches.lock().is_empty());
    }
}
