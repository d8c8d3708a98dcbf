//! Service change events

use crate::health::Health;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of difference observed in the known service set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceChange {
    /// A service id appeared for the first time
    Registered,
    /// An existing id was registered again with new details
    Updated,
    /// A service id disappeared
    Unregistered,
    /// A service's health status flipped between two observations
    HealthChanged {
        /// Health before the transition, if one was recorded
        previous: Option<Health>,
        /// Health after the transition
        current: Health,
    },
}

/// One observed change, emitted for exactly one notification cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceChangeEvent {
    /// Unique id of this emission
    pub event_id: Uuid,

    /// The affected service id
    pub service_id: String,

    /// What changed
    pub change: ServiceChange,

    /// When the change was observed
    pub timestamp: DateTime<Utc>,
}

impl ServiceChangeEvent {
    /// Create an event stamped now.
    pub fn new(service_id: impl Into<String>, change: ServiceChange) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            service_id: service_id.into(),
            change,
            timestamp: Utc::now(),
        }
    }

    /// Whether this event is a health transition.
    pub fn is_health_change(&self) -> bool {
        matches!(self.change, ServiceChange::HealthChanged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    #[test]
    fn test_event_construction() {
        let event = ServiceChangeEvent::new("svc-1", ServiceChange::Registered);

        assert_eq!(event.service_id, "svc-1");
        assert_eq!(event.change, ServiceChange::Registered);
        assert!(!event.is_health_change());
    }

    #[test]
    fn test_health_change_carries_transition() {
        let previous = Health::healthy();
        let current = Health::offline("gone");
        let event = ServiceChangeEvent::new(
            "svc-1",
            ServiceChange::HealthChanged {
                previous: Some(previous.clone()),
                current: current.clone(),
            },
        );

        assert!(event.is_health_change());
        match event.change {
            ServiceChange::HealthChanged { previous: p, current: c } => {
                assert_eq!(p.unwrap().status, HealthStatus::Healthy);
                assert_eq!(c.status, HealthStatus::Offline);
            }
            _ => panic!("expected health change"),
        }
    }
}
