//! Integration tests for crossbar-registry against live HTTP endpoints

use async_trait::async_trait;
use crossbar_core::{BoxError, Capability, Health, HealthStatus, Service};
use crossbar_registry::{DiscoverySource, RegistryConfig, ServiceRegistry};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct LocalWorker {
    id: String,
}

impl LocalWorker {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self { id: id.to_string() })
    }
}

#[async_trait]
impl Service for LocalWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn service_type(&self) -> &str {
        "worker"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::new("chat", "1.2").with_feature("streaming")]
    }

    async fn health(&self) -> Result<Health, BoxError> {
        Ok(Health::healthy())
    }
}

fn config_for(endpoints: &[String]) -> RegistryConfig {
    let mut config = RegistryConfig::new()
        .with_discovery_timeout(Duration::from_secs(2))
        .with_health_timeout(Duration::from_secs(2));
    for endpoint in endpoints {
        config = config.with_endpoint(endpoint.clone());
    }
    config
}

#[tokio::test]
async fn discover_merges_remote_entries_with_locals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "services": [
                {"id": "remote-1", "type": "media", "capabilities": [
                    {"name": "transcode", "version": "2.0", "features": ["h264"]}
                ]},
                {"id": "remote-2"}
            ]
        })))
        .mount(&server)
        .await;

    let endpoint = format!("{}/services/discover", server.uri());
    let registry = ServiceRegistry::new(config_for(&[endpoint]));
    registry.register(LocalWorker::new("local-1"));

    let result = registry.discover().await;

    assert_eq!(result.source, DiscoverySource::Remote);
    assert!(result.errors.is_empty());
    assert_eq!(result.services.len(), 3);

    let remote = result
        .services
        .iter()
        .find(|h| h.id() == "remote-1")
        .unwrap();
    assert!(remote.is_remote());
    assert_eq!(remote.service_type(), "media");
}

#[tokio::test]
async fn local_id_shadows_remote_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "services": [{"id": "local-1", "type": "impostor"}]
        })))
        .mount(&server)
        .await;

    let endpoint = format!("{}/services/discover", server.uri());
    let registry = ServiceRegistry::new(config_for(&[endpoint]));
    registry.register(LocalWorker::new("local-1"));

    let result = registry.discover().await;

    assert_eq!(result.services.len(), 1);
    assert!(!result.services[0].is_remote());
    assert_eq!(result.services[0].service_type(), "worker");
}

#[tokio::test]
async fn dead_endpoints_accumulate_errors_without_dropping_locals() {
    let dead = vec![
        "http://127.0.0.1:1/services/discover".to_string(),
        "http://127.0.0.1:2/services/discover".to_string(),
    ];
    let registry = ServiceRegistry::new(config_for(&dead));
    registry.register(LocalWorker::new("local-1"));

    let result = registry.discover().await;

    assert_eq!(result.source, DiscoverySource::Remote);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.services.len(), 1);
    assert_eq!(result.services[0].id(), "local-1");
}

#[tokio::test]
async fn one_good_one_dead_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "services": [{"id": "remote-x"}]
        })))
        .mount(&server)
        .await;

    let endpoints = vec![
        format!("{}/services/discover", server.uri()),
        "http://127.0.0.1:1/services/discover".to_string(),
    ];
    let registry = ServiceRegistry::new(config_for(&endpoints));
    registry.register(LocalWorker::new("local-1"));

    let result = registry.discover().await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("127.0.0.1:1"));
    let ids: Vec<&str> = result.services.iter().map(|h| h.id()).collect();
    assert!(ids.contains(&"remote-x"));
    assert!(ids.contains(&"local-1"));
}

#[tokio::test]
async fn malformed_payload_yields_zero_services_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 3
        })))
        .mount(&server)
        .await;

    let endpoint = format!("{}/services/discover", server.uri());
    let registry = ServiceRegistry::new(config_for(&[endpoint]));
    registry.register(LocalWorker::new("local-1"));

    let result = registry.discover().await;

    assert!(result.errors.is_empty());
    assert_eq!(result.services.len(), 1);
}

#[tokio::test]
async fn remote_proxy_resolves_health_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "services": [{"id": "remote-1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/discover/remote-1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "last_check": "2026-08-01T10:00:00Z"
        })))
        .mount(&server)
        .await;

    let endpoint = format!("{}/services/discover", server.uri());
    let registry = ServiceRegistry::new(config_for(&[endpoint]));

    let result = registry.discover().await;
    let remote = &result.services[0];

    let health = remote.health().await;
    assert_eq!(health.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn remote_proxy_degrades_to_offline_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "services": [{"id": "remote-1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/discover/remote-1/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let endpoint = format!("{}/services/discover", server.uri());
    let registry = ServiceRegistry::new(config_for(&[endpoint]));

    let result = registry.discover().await;
    let health = result.services[0].health().await;

    assert_eq!(health.status, HealthStatus::Offline);
    assert!(health.error.is_some());
}
