// Crossbar - capability-based service registry and discovery for Rust
//
// Workers advertise capabilities, callers find the best available
// implementation, and an independent poller watches remote membership
// and health over HTTP.

// Re-export the shared data model
pub use crossbar_core::*;

// Re-export the component crates
pub use crossbar_discovery;
pub use crossbar_matcher;
pub use crossbar_registry;

// Prelude for common imports
pub mod prelude {
    pub use crossbar_core::{
        BoxError, Capability, CapabilityQuery, CapabilitySource, DiscoveredService, Health,
        HealthStatus, Service, ServiceChange, ServiceChangeEvent, ServiceResult,
    };
    pub use crossbar_discovery::{DiscoveryConfig, ServiceDiscovery};
    pub use crossbar_matcher::{
        CandidateSelector, CapabilityMatcher, MatchWeights, SelectionStrategy,
    };
    pub use crossbar_registry::{
        DiscoveryResult, DiscoverySource, RegistryConfig, ServiceHandle, ServiceRegistry,
    };
}
