//! Service registry for Crossbar
//!
//! The process-local source of truth for capability-providing services:
//! a synchronous service table, cached health with change detection, and
//! on-demand remote discovery that merges configured HTTP endpoints into
//! one candidate list.
//!
//! ## Features
//!
//! - **Registration** - Insert/replace by id; re-registration is an
//!   update, never a duplicate
//! - **Lookup** - By id, type tag, or capability term (name or feature)
//! - **Discovery** - Local table plus every configured endpoint, with
//!   per-endpoint failures surfaced as data instead of errors
//! - **Remote proxies** - Discovered entries wrapped as read-only
//!   handles whose health is a fresh HTTP request per call
//! - **Change events** - Synchronous pub/sub with per-listener isolation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crossbar_registry::{RegistryConfig, ServiceRegistry};
//!
//! let registry = ServiceRegistry::new(
//!     RegistryConfig::new().with_endpoint("http://node-b:7400/services/discover"),
//! );
//! registry.register(my_service);
//!
//! let result = registry.discover().await;
//! for handle in &result.services {
//!     println!("{} ({})", handle.id(), handle.service_type());
//! }
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod registry;
pub mod shared;

pub use config::{RegistryConfig, parse_endpoint_list};
pub use error::RegistryError;
pub use handle::{RemoteService, ServiceHandle};
pub use registry::{
    ChangeSubscription, DiscoveryResult, DiscoverySource, ServiceRegistry,
};
pub use shared::{init_shared, reset_shared, shared};
