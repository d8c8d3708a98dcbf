//! Candidate selection over a ranked match list

use crate::matcher::Match;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Strategy for picking one candidate from the qualifying matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Always pick the best-ranked candidate
    First,
    /// Rotate through the qualifying candidates
    RoundRobin,
    /// Pick a qualifying candidate at random
    Random,
}

/// Picks one candidate from an already-ranked match list.
///
/// Selection never re-scores or re-orders: the matcher decides who
/// qualifies, the selector only spreads load across the survivors.
pub struct CandidateSelector {
    strategy: SelectionStrategy,
    round_robin_index: AtomicUsize,
}

impl CandidateSelector {
    /// Create a selector with the given strategy.
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            round_robin_index: AtomicUsize::new(0),
        }
    }

    /// Select one candidate, or `None` when the match list is empty.
    pub fn select<'a, S>(&self, matches: &[Match<'a, S>]) -> Option<&'a S> {
        if matches.is_empty() {
            return None;
        }

        let index = match self.strategy {
            SelectionStrategy::First => 0,
            SelectionStrategy::RoundRobin => {
                self.round_robin_index.fetch_add(1, Ordering::SeqCst) % matches.len()
            }
            SelectionStrategy::Random => {
                use rand::Rng;
                rand::rng().random_range(0..matches.len())
            }
        };

        debug!(strategy = ?self.strategy, index, "Selected candidate");
        matches.get(index).map(|m| m.candidate)
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(SelectionStrategy::First)
    }
}
