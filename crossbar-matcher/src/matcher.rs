//! Scored capability matching

use crate::version::{compare_versions, highest_version};
use crossbar_core::{CapabilityQuery, CapabilitySource, capabilities_match_term};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Score weights for the three match dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchWeights {
    /// Added per matched required term
    pub required: u32,
    /// Added per matched preferred term
    pub preferred: u32,
    /// Added once when `min_version` is met
    pub version: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            required: 100,
            preferred: 10,
            version: 5,
        }
    }
}

impl MatchWeights {
    /// Set the per-required-term weight.
    pub fn with_required(mut self, weight: u32) -> Self {
        self.required = weight;
        self
    }

    /// Set the per-preferred-term weight.
    pub fn with_preferred(mut self, weight: u32) -> Self {
        self.preferred = weight;
        self
    }

    /// Set the version-bonus weight.
    pub fn with_version(mut self, weight: u32) -> Self {
        self.version = weight;
        self
    }
}

/// Detailed score breakdown for one candidate against one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Total score; 0 when the candidate is disqualified
    pub total: u32,

    /// Required terms the candidate matched
    pub matched_required: Vec<String>,

    /// Preferred terms the candidate matched
    pub matched_preferred: Vec<String>,

    /// Required terms the candidate is missing; non-empty disqualifies
    pub missing_required: Vec<String>,

    /// Whether the candidate's highest capability version met
    /// `min_version`
    pub version_satisfied: bool,
}

impl MatchScore {
    /// Whether the candidate satisfies every required term.
    pub fn qualifies(&self) -> bool {
        self.missing_required.is_empty()
    }
}

/// One qualifying candidate with its score.
#[derive(Debug)]
pub struct Match<'a, S> {
    /// The candidate, borrowed from the caller's list
    pub candidate: &'a S,

    /// Score breakdown
    pub score: MatchScore,
}

/// Pure scoring and ranking over a supplied candidate list.
///
/// Holds only weights; never mutates its inputs. An empty candidate list
/// returns empty/none, never an error, and a query with no required terms
/// matches every candidate.
#[derive(Debug, Clone, Default)]
pub struct CapabilityMatcher {
    weights: MatchWeights,
}

impl CapabilityMatcher {
    /// Create a matcher with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher with custom weights.
    pub fn with_weights(weights: MatchWeights) -> Self {
        Self { weights }
    }

    /// Numeric score for one candidate; 0 when disqualified.
    pub fn score<S: CapabilitySource>(&self, query: &CapabilityQuery, candidate: &S) -> u32 {
        self.detailed_score(query, candidate).total
    }

    /// Full score breakdown for one candidate.
    pub fn detailed_score<S: CapabilitySource>(
        &self,
        query: &CapabilityQuery,
        candidate: &S,
    ) -> MatchScore {
        let capabilities = candidate.capability_set();

        let mut matched_required = Vec::new();
        let mut missing_required = Vec::new();
        for term in &query.required {
            if capabilities_match_term(&capabilities, term) {
                matched_required.push(term.clone());
            } else {
                missing_required.push(term.clone());
            }
        }

        let matched_preferred: Vec<String> = query
            .preferred
            .iter()
            .filter(|term| capabilities_match_term(&capabilities, term))
            .cloned()
            .collect();

        let version_satisfied = match &query.min_version {
            Some(min) => highest_version(&capabilities)
                .map(|v| compare_versions(v, min) != Ordering::Less)
                .unwrap_or(false),
            None => false,
        };

        // Required terms are a hard filter: any miss zeroes the score.
        let total = if missing_required.is_empty() {
            let mut total = matched_required.len() as u32 * self.weights.required
                + matched_preferred.len() as u32 * self.weights.preferred;
            if version_satisfied {
                total += self.weights.version;
            }
            total
        } else {
            0
        };

        MatchScore {
            total,
            matched_required,
            matched_preferred,
            missing_required,
            version_satisfied,
        }
    }

    /// All satisfying candidates, best-first. Ties keep encounter order.
    pub fn find_all_matching<'a, S: CapabilitySource>(
        &self,
        query: &CapabilityQuery,
        candidates: &'a [S],
    ) -> Vec<Match<'a, S>> {
        let mut matches: Vec<Match<'a, S>> = candidates
            .iter()
            .map(|candidate| Match {
                candidate,
                score: self.detailed_score(query, candidate),
            })
            .filter(|m| m.score.qualifies())
            .collect();

        // Stable sort keeps encounter order for equal scores.
        matches.sort_by(|a, b| b.score.total.cmp(&a.score.total));
        matches
    }

    /// The single best match, or `None` when nothing qualifies.
    pub fn find_best_match<'a, S: CapabilitySource>(
        &self,
        query: &CapabilityQuery,
        candidates: &'a [S],
    ) -> Option<Match<'a, S>> {
        let mut best: Option<Match<'a, S>> = None;

        for candidate in candidates {
            let score = self.detailed_score(query, candidate);
            if !score.qualifies() {
                continue;
            }
            // Strictly-greater keeps the first candidate on ties.
            let better = best
                .as_ref()
                .map(|b| score.total > b.score.total)
                .unwrap_or(true);
            if better {
                best = Some(Match { candidate, score });
            }
        }

        best
    }
}
