//! Capability matching for Crossbar
//!
//! A pure scoring and ranking layer over a supplied candidate list. The
//! matcher holds no state, never mutates its inputs, and is deterministic:
//! the same query over the same candidates always produces the same
//! ranking, with ties kept in encounter order.
//!
//! ## Scoring
//!
//! - Every matched **required** term adds `required` weight (default 100).
//!   Missing any required term disqualifies the candidate entirely.
//! - Every matched **preferred** term adds `preferred` weight (default
//!   10); preferred terms never disqualify.
//! - Meeting `min_version` (against the candidate's highest capability
//!   version) adds `version` weight (default 5); failing it only withholds
//!   the bonus.
//!
//! ## Quick Start
//!
//! ```rust
//! use crossbar_core::{Capability, CapabilityQuery, DiscoveredService, Health};
//! use crossbar_matcher::CapabilityMatcher;
//! # fn candidate(id: &str, caps: Vec<Capability>) -> DiscoveredService {
//! #     DiscoveredService {
//! #         id: id.into(), name: id.into(), service_type: "worker".into(),
//! #         endpoint: "http://localhost:9000".into(), capabilities: caps,
//! #         health: Health::healthy(), metadata: Default::default(),
//! #         discovered_at: chrono::Utc::now(), last_seen: chrono::Utc::now(),
//! #     }
//! # }
//!
//! let matcher = CapabilityMatcher::new();
//! let services = vec![
//!     candidate("a", vec![Capability::new("chat", "1.2").with_feature("streaming")]),
//!     candidate("b", vec![Capability::new("search", "2.0")]),
//! ];
//!
//! let query = CapabilityQuery::new().require("chat");
//! let best = matcher.find_best_match(&query, &services).unwrap();
//! assert_eq!(best.candidate.id, "a");
//! assert!(best.score.total >= 100);
//! ```

pub mod matcher;
pub mod selection;
pub mod version;

pub use matcher::{CapabilityMatcher, Match, MatchScore, MatchWeights};
pub use selection::{CandidateSelector, SelectionStrategy};
pub use version::{compare_versions, highest_version};
