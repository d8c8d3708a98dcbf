//! Process-wide registry handle
//!
//! A lazily-initialized shared handle behind an explicit create/reset
//! API, so tests can isolate state deterministically instead of relying
//! on module-level singleton magic.

use crate::config::RegistryConfig;
use crate::registry::ServiceRegistry;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

static SHARED: Lazy<RwLock<Option<Arc<ServiceRegistry>>>> = Lazy::new(|| RwLock::new(None));

/// The process-wide registry, created on first use from
/// [`RegistryConfig::from_env`].
pub fn shared() -> Arc<ServiceRegistry> {
    if let Some(registry) = SHARED.read().clone() {
        return registry;
    }

    let mut guard = SHARED.write();
    if let Some(registry) = guard.as_ref() {
        return registry.clone();
    }

    debug!("Initializing shared registry from environment");
    let registry = Arc::new(ServiceRegistry::new(RegistryConfig::from_env()));
    *guard = Some(registry.clone());
    registry
}

/// Replace the process-wide registry with one built from `config`.
pub fn init_shared(config: RegistryConfig) -> Arc<ServiceRegistry> {
    let registry = Arc::new(ServiceRegistry::new(config));
    *SHARED.write() = Some(registry.clone());
    registry
}

/// Drop the process-wide registry. The next [`shared`] call creates a
/// fresh one; handles already cloned out keep working on the old
/// instance.
pub fn reset_shared() {
    *SHARED.write() = None;
}
