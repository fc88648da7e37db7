//! Stateless fuzzy ranking of candidate names.
//!
//! [`FuzzyMatcher`] scores a query against an ordered candidate list with the
//! weighted ratio in [`scorer`], keeps entries at or above a threshold, and
//! returns them by descending score. Ties keep candidate input order, so the
//! result is deterministic for a given (query, candidates) pair.

pub mod scorer;

use serde::Serialize;

use crate::types::normalize_name;

/// Default minimum similarity score.
pub const DEFAULT_THRESHOLD: u8 = 50;
/// Default number of results returned.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A candidate that scored at or above the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyMatch {
    /// The matched candidate, exactly as supplied.
    pub name: String,
    /// Truncated similarity score, 0 to 100.
    pub score: u8,
    /// Position of the candidate in the input list.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatcher {
    threshold: u8,
    max_results: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_MAX_RESULTS)
    }
}

impl FuzzyMatcher {
    /// Creates a matcher. Range checks on `threshold` (0-100) and
    /// `max_results` (at least 1) belong to the caller's boundary.
    pub fn new(threshold: u8, max_results: usize) -> Self {
        Self {
            threshold,
            max_results,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Ranks `candidates` against `query` with the configured defaults.
    pub fn find_matches<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Vec<FuzzyMatch> {
        self.find_matches_with(query, candidates, None, None)
    }

    /// Ranks `candidates` against `query`, overriding threshold and limit.
    ///
    /// The query is normalized; candidates are expected to be normalized
    /// already and are compared as given.
    pub fn find_matches_with<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
        threshold: Option<u8>,
        limit: Option<usize>,
    ) -> Vec<FuzzyMatch> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let threshold = f64::from(threshold.unwrap_or(self.threshold));
        let limit = limit.unwrap_or(self.max_results);
        let query = normalize_name(query);

        let mut scored: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| (index, scorer::wratio(&query, candidate.as_ref())))
            .filter(|&(_, score)| score >= threshold)
            .collect();

        // Stable sort keeps input order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(index, score)| FuzzyMatch {
                name: candidates[index].as_ref().to_string(),
                score: score as u8,
                index,
            })
            .collect()
    }

    /// The single best match, if any candidate reaches the threshold.
    pub fn find_best_match<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
        threshold: Option<u8>,
    ) -> Option<FuzzyMatch> {
        self.find_matches_with(query, candidates, threshold, Some(1))
            .into_iter()
            .next()
    }
}
