//! Service trait and the normalized remote-service view

use crate::capability::Capability;
use crate::health::Health;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Boxed error for service-implementor callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for lifecycle hooks.
pub type ServiceResult = Result<(), BoxError>;

/// A capability-providing unit owned by its creating process.
///
/// The registry holds a non-owning reference (`Arc<dyn Service>`); the
/// business logic behind these calls is opaque to it. `health()`,
/// `initialize()`, and `shutdown()` may suspend at the network boundary;
/// the identity accessors never do.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable identifier, unique per registry instance.
    fn id(&self) -> &str;

    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Type tag (e.g. "worker", "media").
    fn service_type(&self) -> &str;

    /// The capabilities this service currently advertises.
    fn capabilities(&self) -> Vec<Capability>;

    /// Compute a fresh health report.
    async fn health(&self) -> Result<Health, BoxError>;

    /// Called once when the owning process brings the service up.
    async fn initialize(&self) -> ServiceResult {
        Ok(())
    }

    /// Called during registry shutdown. Best-effort; errors are logged by
    /// the caller, never propagated to other services.
    async fn shutdown(&self) -> ServiceResult {
        Ok(())
    }
}

/// Normalized external view of a service learned from a discovery
/// endpoint.
///
/// Behavior-free: the only operation a discovered service supports is an
/// HTTP health check against its endpoint, performed by the registry's
/// remote proxy. Entries are replaced wholesale each poll cycle, never
/// merged across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredService {
    /// Stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Type tag
    #[serde(rename = "type")]
    pub service_type: String,

    /// Base URL the service is reachable at
    pub endpoint: String,

    /// Advertised capabilities
    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Last known health report
    pub health: Health,

    /// Opaque key/value metadata from the descriptor
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// When this service was first seen
    pub discovered_at: DateTime<Utc>,

    /// When this service was last present in a poll
    pub last_seen: DateTime<Utc>,
}

/// A uniform capability view over local and remote candidates.
///
/// The matcher ranks anything implementing this trait, so callers can mix
/// in-process services and discovered remote entries in one candidate
/// list.
pub trait CapabilitySource {
    /// Stable identifier of the candidate.
    fn source_id(&self) -> &str;

    /// The candidate's advertised capabilities.
    fn capability_set(&self) -> Vec<Capability>;
}

impl CapabilitySource for DiscoveredService {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn capability_set(&self) -> Vec<Capability> {
        self.capabilities.clone()
    }
}

impl CapabilitySource for Arc<dyn Service> {
    fn source_id(&self) -> &str {
        self.id()
    }

    fn capability_set(&self) -> Vec<Capability> {
        self.capabilities()
    }
}
