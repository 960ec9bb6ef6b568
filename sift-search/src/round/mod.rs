//! Search rounds: provider fan-out, exact-text dedup and cache write-through.

pub mod dedup;
pub mod executor;

pub use executor::{SearchRound, SearchRoundExecutor};
