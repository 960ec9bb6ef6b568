//! sift: iterative, LLM-guided web search refinement.
//!
//! A session runs a fixed number of search rounds:
//! Query → search round (cache or providers) → propose next query →
//! diversity gate → next round … → summary
//!
//! # Architecture
//!
//! - **Search rounds**: provided by `sift-search`, which fans out to every
//!   configured provider and caches merged results on disk
//! - **Diversity gate**: asks the completion provider whether a proposed query
//!   explores something new, regenerating a bounded number of times
//! - **Orchestrator**: drives the rounds and accumulates results in a
//!   [`SessionState`]
//! - **Interpretation and summary**: one completion call each, before and after
//!   the rounds

pub mod app;
pub mod config;
pub mod diversity;
pub mod error;
pub mod interpret;
pub mod llm;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod session;
pub mod sift_dirs;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::{App, DialoguerPrompter, Prompter, SessionReport};
pub use config::SiftConfig;
pub use diversity::DiversityGate;
pub use error::{Result, SiftError};
pub use interpret::{QueryInterpretation, interpret_query};
pub use orchestrator::RefinementOrchestrator;
pub use progress::{RefinementCallback, RefinementEvent};
pub use session::{RoundOutcome, SessionState};
pub use summary::generate_summary;
