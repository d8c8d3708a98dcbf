//! Polling service discovery for Crossbar
//!
//! An eventually-consistent view of the services known to a set of
//! remote discovery endpoints. The poller queries every endpoint on a
//! cycle, diffs the combined result against the previous one, and hands
//! watchers a batch of added / removed / health-changed events. Its
//! life-cycle is independent of any registry: zero, one, or many pollers
//! may run in one process.
//!
//! ## Features
//!
//! - **Polling** - One immediate poll plus a recurring interval
//!   (default 30s), idempotent start/stop
//! - **Per-endpoint retries** - Linear backoff, endpoint failures
//!   isolated from each other
//! - **Change detection** - Added, removed, and health-status
//!   transitions; the internal map is replaced wholesale every cycle
//! - **Permissive normalization** - Sparse payloads default rather than
//!   failing a cycle
//! - **Self-advertisement** - Best-effort `register_local` broadcast to
//!   each endpoint's registration path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crossbar_discovery::{DiscoveryConfig, ServiceDiscovery};
//!
//! let discovery = ServiceDiscovery::new(
//!     vec!["http://node-b:7400/services/discover".to_string()],
//!     DiscoveryConfig::default(),
//! );
//!
//! let _watch = discovery.watch_for_changes(|changes| {
//!     for change in changes {
//!         println!("{}: {:?}", change.service_id, change.change);
//!     }
//! });
//!
//! discovery.start_auto_refresh();
//! ```

pub mod config;
pub mod error;
pub mod poller;

pub use config::DiscoveryConfig;
pub use error::DiscoveryError;
pub use poller::{ServiceDiscovery, WatchSubscription};
