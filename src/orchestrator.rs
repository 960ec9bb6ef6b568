//! The bounded multi-round refinement loop.

use std::sync::Arc;

use sift_search::SearchRound;
use sift_search::round::dedup::extend_unique;

use crate::diversity::DiversityGate;
use crate::error::Result;
use crate::progress::{RefinementCallback, RefinementEvent};
use crate::session::{RoundOutcome, SessionState};

/// Runs a fixed number of search rounds, refining the query between them.
pub struct RefinementOrchestrator {
    round: Arc<dyn SearchRound>,
    gate: DiversityGate,
    max_rounds: usize,
    on_event: Option<RefinementCallback>,
}

impl RefinementOrchestrator {
    /// Create an orchestrator running `max_rounds` rounds (at least 1).
    pub fn new(round: Arc<dyn SearchRound>, gate: DiversityGate, max_rounds: usize) -> Self {
        Self {
            round,
            gate,
            max_rounds: max_rounds.max(1),
            on_event: None,
        }
    }

    /// Report progress through `callback`.
    pub fn with_callback(mut self, callback: RefinementCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Rounds per session.
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// The gate used between rounds.
    pub fn gate(&self) -> &DiversityGate {
        &self.gate
    }

    /// Run every round for `session` and return the accumulated results.
    ///
    /// Executes exactly `max_rounds` rounds and requests at most
    /// `max_rounds - 1` new queries. There is no early exit: a round that
    /// returns nothing still counts.
    ///
    /// # Errors
    ///
    /// Propagates completion provider failures from query proposal. Search
    /// failures never surface here.
    pub async fn run(&self, session: &mut SessionState) -> Result<Vec<String>> {
        let mut query = session.original_query.clone();

        for round_number in 1..=self.max_rounds {
            self.emit(RefinementEvent::RoundStarted {
                round: round_number,
                max_rounds: self.max_rounds,
                query: query.clone(),
            });

            let results = self.round.execute(&query).await;
            let new_results = extend_unique(&mut session.accumulated_results, &results);
            tracing::info!(
                round = round_number,
                returned = results.len(),
                new = new_results,
                "search round complete"
            );
            self.emit(RefinementEvent::RoundCompleted {
                outcome: RoundOutcome {
                    round_number,
                    query: query.clone(),
                    results,
                },
                new_results,
            });

            if round_number < self.max_rounds {
                query = self.gate.propose_next_query(session).await?;
                self.emit(RefinementEvent::NextQuery {
                    round: round_number + 1,
                    query: query.clone(),
                });
            }
        }

        self.emit(RefinementEvent::Finished {
            rounds: self.max_rounds,
            total_results: session.accumulated_results.len(),
        });
        Ok(session.accumulated_results.clone())
    }

    fn emit(&self, event: RefinementEvent) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }
}
