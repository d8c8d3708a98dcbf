//! Wire payload for discovery endpoints
//!
//! A discovery endpoint may return either a bare array of descriptors or
//! `{ "services": [...] }`, and every descriptor field except `id` is
//! optional. Normalization is permissive: missing fields default, so a
//! sparse payload never fails discovery outright.

use crate::capability::Capability;
use crate::health::{Health, HealthStatus};
use crate::service::DiscoveredService;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Accepted endpoint response shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DiscoveryPayload {
    /// `{ "services": [...] }`
    Wrapped {
        /// The descriptor list
        services: Vec<RawDescriptor>,
    },
    /// A bare array of descriptors
    List(Vec<RawDescriptor>),
}

impl DiscoveryPayload {
    /// Unwrap to the descriptor list regardless of shape.
    pub fn into_descriptors(self) -> Vec<RawDescriptor> {
        match self {
            Self::Wrapped { services } => services,
            Self::List(services) => services,
        }
    }
}

/// One service descriptor as a remote node reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDescriptor {
    /// Stable identifier; the only required field
    pub id: String,

    /// Display name; defaults to the id
    pub name: Option<String>,

    /// Type tag; defaults to "unknown"
    #[serde(rename = "type")]
    pub service_type: Option<String>,

    /// Base URL of the service; defaults to the polled endpoint
    pub endpoint: Option<String>,

    /// Advertised capabilities; defaults to empty
    pub capabilities: Option<Vec<Capability>>,

    /// Last health report; defaults to offline, stamped now
    pub health: Option<RawHealth>,

    /// Opaque metadata
    pub metadata: Option<HashMap<String, String>>,
}

/// Health as reported on the wire; every field optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHealth {
    /// Reported status; defaults to offline
    pub status: Option<HealthStatus>,

    /// When the remote node produced the report; defaults to now
    #[serde(alias = "lastCheck")]
    pub last_check: Option<DateTime<Utc>>,

    /// Diagnostic detail
    pub error: Option<String>,
}

impl RawHealth {
    fn into_health(self) -> Health {
        Health {
            status: self.status.unwrap_or(HealthStatus::Offline),
            last_check: self.last_check.unwrap_or_else(Utc::now),
            error: self.error,
        }
    }
}

impl RawDescriptor {
    /// Normalize into the canonical [`DiscoveredService`] shape.
    ///
    /// `source_endpoint` is the discovery endpoint the descriptor came
    /// from, used when the descriptor does not carry its own endpoint.
    pub fn into_discovered(self, source_endpoint: &str) -> DiscoveredService {
        let now = Utc::now();
        DiscoveredService {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            service_type: self.service_type.unwrap_or_else(|| "unknown".to_string()),
            endpoint: self
                .endpoint
                .unwrap_or_else(|| source_endpoint.to_string()),
            capabilities: self.capabilities.unwrap_or_default(),
            health: self
                .health
                .map(RawHealth::into_health)
                .unwrap_or_else(|| Health {
                    status: HealthStatus::Offline,
                    last_check: now,
                    error: None,
                }),
            metadata: self.metadata.unwrap_or_default(),
            discovered_at: now,
            last_seen: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bare_array() {
        let payload: DiscoveryPayload =
            serde_json::from_str(r#"[{"id": "svc-1"}, {"id": "svc-2"}]"#).unwrap();

        assert_eq!(payload.into_descriptors().len(), 2);
    }

    #[test]
    fn test_accepts_wrapped_object() {
        let payload: DiscoveryPayload =
            serde_json::from_str(r#"{"services": [{"id": "svc-1"}]}"#).unwrap();

        assert_eq!(payload.into_descriptors().len(), 1);
    }

    #[test]
    fn test_rejects_other_shapes() {
        let result: Result<DiscoveryPayload, _> = serde_json::from_str(r#"{"count": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sparse_descriptor_defaults() {
        let raw: RawDescriptor = serde_json::from_str(r#"{"id": "svc-1"}"#).unwrap();
        let discovered = raw.into_discovered("http://node-a:7400/services/discover");

        assert_eq!(discovered.name, "svc-1");
        assert_eq!(discovered.service_type, "unknown");
        assert_eq!(discovered.endpoint, "http://node-a:7400/services/discover");
        assert!(discovered.capabilities.is_empty());
        assert_eq!(discovered.health.status, HealthStatus::Offline);
    }

    #[test]
    fn test_full_descriptor_round_trip() {
        let raw: RawDescriptor = serde_json::from_str(
            r#"{
                "id": "media-1",
                "name": "Media Worker",
                "type": "media",
                "endpoint": "http://media-1:9000",
                "capabilities": [{"name": "transcode", "version": "2.1", "features": ["h264"]}],
                "health": {"status": "healthy", "lastCheck": "2026-08-01T10:00:00Z"},
                "metadata": {"region": "us-east"}
            }"#,
        )
        .unwrap();
        let discovered = raw.into_discovered("http://node-a:7400/services/discover");

        assert_eq!(discovered.name, "Media Worker");
        assert_eq!(discovered.endpoint, "http://media-1:9000");
        assert_eq!(discovered.capabilities[0].features, vec!["h264"]);
        assert_eq!(discovered.health.status, HealthStatus::Healthy);
        assert_eq!(discovered.metadata["region"], "us-east");
    }
}
