//! Health status reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational
    Healthy,
    /// Operational with reduced capacity or a recent fault
    Degraded,
    /// Unreachable or failing
    Offline,
}

/// A point-in-time health report.
///
/// Health is transient: it is recomputed on demand or cached with its
/// timestamp, and a cached value is trusted only for the cycle that
/// produced it. It is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Operational status
    pub status: HealthStatus,

    /// When this report was produced
    #[serde(default = "Utc::now", alias = "lastCheck")]
    pub last_check: DateTime<Utc>,

    /// Diagnostic detail for degraded/offline reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Health {
    /// A healthy report stamped now.
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            last_check: Utc::now(),
            error: None,
        }
    }

    /// A degraded report stamped now.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            last_check: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// An offline report stamped now.
    pub fn offline(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Offline,
            last_check: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Whether the status is `Healthy`.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::healthy()
    }
}
