//! Capability declarations and queries

use serde::{Deserialize, Serialize};

/// A named unit of functionality a service claims to provide.
///
/// The capability name and its feature tags together form the matchable
/// vocabulary: a query term matches a capability if it equals the name or
/// any feature tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Capability name (e.g. "chat", "transcode")
    pub name: String,

    /// Version string, compared as dot-separated numeric segments
    pub version: String,

    /// Feature tags qualifying this capability
    #[serde(default)]
    pub features: Vec<String>,
}

impl Capability {
    /// Create a new capability with no feature tags.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            features: Vec::new(),
        }
    }

    /// Add a feature tag.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Check whether a query term matches this capability's name or any
    /// of its feature tags.
    pub fn matches_term(&self, term: &str) -> bool {
        self.name == term || self.features.iter().any(|f| f == term)
    }
}

/// Check a term against every capability in a set.
///
/// This is the single definition of term matching used by both the scored
/// matcher and the registry's unscored `get_by_capability` lookup, so the
/// two sides cannot drift apart.
pub fn capabilities_match_term(capabilities: &[Capability], term: &str) -> bool {
    capabilities.iter().any(|c| c.matches_term(term))
}

/// A request for capability names or feature tags used to select
/// candidate services.
///
/// Missing any `required` term disqualifies a candidate outright;
/// `preferred` terms only add score; `min_version` only withholds a bonus
/// when unmet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityQuery {
    /// Terms every candidate must match
    #[serde(default)]
    pub required: Vec<String>,

    /// Terms that improve a candidate's score without disqualifying
    #[serde(default)]
    pub preferred: Vec<String>,

    /// Minimum capability version for the version bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

impl CapabilityQuery {
    /// Create an empty query. An empty query matches every candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required term.
    pub fn require(mut self, term: impl Into<String>) -> Self {
        self.required.push(term.into());
        self
    }

    /// Add a preferred term.
    pub fn prefer(mut self, term: impl Into<String>) -> Self {
        self.preferred.push(term.into());
        self
    }

    /// Set the minimum version for the version bonus.
    pub fn min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }
}
