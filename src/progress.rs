//! Progress events for a refinement session.
//!
//! The orchestrator reports what it is doing through a callback so the
//! library itself never prints.

use crate::session::RoundOutcome;

/// Progress events emitted by [`RefinementOrchestrator`](crate::orchestrator::RefinementOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefinementEvent {
    /// A round is about to run.
    RoundStarted {
        /// 1-based round index.
        round: usize,
        /// Total rounds in this session.
        max_rounds: usize,
        /// The query this round runs.
        query: String,
    },
    /// A round finished.
    RoundCompleted {
        /// What the round returned.
        outcome: RoundOutcome,
        /// Lines added to the session that it had not seen before.
        new_results: usize,
    },
    /// The query for the next round was chosen.
    NextQuery {
        /// The round that will run it.
        round: usize,
        /// The chosen query.
        query: String,
    },
    /// All rounds ran.
    Finished {
        /// Rounds executed.
        rounds: usize,
        /// Distinct result lines collected.
        total_results: usize,
    },
}

/// Callback type for receiving refinement progress events.
pub type RefinementCallback = Box<dyn Fn(RefinementEvent) + Send + Sync>;
