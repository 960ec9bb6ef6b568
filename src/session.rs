//! Per-session refinement state.

use sift_search::ResultSet;

/// Everything one search session has learned so far.
///
/// Created when the user submits a query and dropped when the summary is
/// printed. Never persisted and never shared between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The query the user asked (after any addendum).
    pub original_query: String,
    /// Queries proposed and accepted by the diversity gate, in order.
    ///
    /// The original query is not included; the first proposal is therefore
    /// checked against an empty history.
    pub used_queries: Vec<String>,
    /// Result lines from every round, without exact duplicates.
    pub accumulated_results: ResultSet,
}

impl SessionState {
    /// Start a session for `original_query`.
    pub fn new(original_query: impl Into<String>) -> Self {
        Self {
            original_query: original_query.into(),
            used_queries: Vec::new(),
            accumulated_results: Vec::new(),
        }
    }

    /// Clear history and start over with a new query.
    pub fn reset(&mut self, original_query: impl Into<String>) {
        *self = Self::new(original_query);
    }

    /// The query the next round would run if no new one is accepted.
    pub fn current_query(&self) -> &str {
        self.used_queries
            .last()
            .map_or(self.original_query.as_str(), String::as_str)
    }
}

/// The result of one executed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// 1-based round index.
    pub round_number: usize,
    /// The query the round ran.
    pub query: String,
    /// Lines returned by the round (cached or fresh).
    pub results: ResultSet,
}
