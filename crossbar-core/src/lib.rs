//! Core data model for Crossbar
//!
//! This crate defines the vocabulary shared by the registry, the matcher,
//! and the discovery poller.
//!
//! ## Concepts
//!
//! - **Capability** - A named unit of functionality a service claims,
//!   qualified by a version string and feature tags
//! - **Service** - A capability-providing unit with lifecycle hooks and an
//!   on-demand health check
//! - **DiscoveredService** - The normalized, behavior-free view of a
//!   service learned from a remote discovery endpoint
//! - **ServiceChangeEvent** - A notification of one observed difference in
//!   the known service set between two points in time
//!
//! ## Quick Start
//!
//! ```rust
//! use crossbar_core::{Capability, CapabilityQuery};
//!
//! let cap = Capability::new("chat", "1.2").with_feature("streaming");
//! assert!(cap.matches_term("chat"));
//! assert!(cap.matches_term("streaming"));
//!
//! let query = CapabilityQuery::new()
//!     .require("chat")
//!     .prefer("streaming")
//!     .min_version("1.0");
//! assert_eq!(query.required, vec!["chat"]);
//! ```

pub mod capability;
pub mod event;
pub mod health;
pub mod payload;
pub mod service;

pub use capability::{Capability, CapabilityQuery, capabilities_match_term};
pub use event::{ServiceChange, ServiceChangeEvent};
pub use health::{Health, HealthStatus};
pub use payload::{DiscoveryPayload, RawDescriptor, RawHealth};
pub use service::{
    BoxError, CapabilitySource, DiscoveredService, Service, ServiceResult,
};
