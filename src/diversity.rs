//! Query diversity gate.
//!
//! Decides whether a proposed query explores something the session has not
//! already searched, and drives the bounded regeneration loop that picks the
//! next round's query.

use std::sync::Arc;

use crate::error::Result;
use crate::llm::{CompletionOptions, CompletionProvider};
use crate::prompts;
use crate::session::SessionState;

/// Proposals tried per round before the last one is accepted anyway.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Follow-up suggestions returned by [`DiversityGate::suggest_follow_up_queries`].
pub const FOLLOW_UP_COUNT: usize = 3;

const JUDGE_TEMPERATURE: f64 = 0.1;
const PROPOSE_TEMPERATURE: f64 = 0.7;

/// Judges query novelty and proposes follow-up queries.
pub struct DiversityGate {
    provider: Arc<dyn CompletionProvider>,
    max_attempts: usize,
}

impl DiversityGate {
    /// Create a gate that asks `provider` for proposals and verdicts.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the proposal budget. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Proposal budget per call to [`propose_next_query`](Self::propose_next_query).
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// One verdict per candidate: `true` if it differs enough from every
    /// query in `prior`.
    ///
    /// With no prior queries every candidate is diverse and the provider is
    /// not called. Verdicts the model leaves out count as not diverse.
    ///
    /// # Errors
    ///
    /// Propagates completion provider failures.
    pub async fn is_diverse(&self, candidates: &[String], prior: &[String]) -> Result<Vec<bool>> {
        if prior.is_empty() {
            return Ok(vec![true; candidates.len()]);
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let options = CompletionOptions::new().with_temperature(JUDGE_TEMPERATURE);
        let reply = self
            .provider
            .complete(
                prompts::SIMILARITY_SYSTEM,
                &prompts::similarity_user(candidates, prior),
                &options,
            )
            .await?;

        let verdicts = parse_verdicts(&reply, candidates.len());
        tracing::debug!(?verdicts, "diversity verdicts");
        Ok(verdicts)
    }

    /// Pick the query for the next round and record it in `session`.
    ///
    /// Asks for one candidate at a time, up to the attempt budget. The first
    /// diverse candidate is appended to `session.used_queries` and returned.
    /// If none is judged diverse the last non-blank candidate is accepted
    /// anyway. If every reply was blank, the session's current query is
    /// returned and nothing is appended.
    ///
    /// # Errors
    ///
    /// Propagates completion provider failures.
    pub async fn propose_next_query(&self, session: &mut SessionState) -> Result<String> {
        let options = CompletionOptions::new().with_temperature(PROPOSE_TEMPERATURE);
        let mut last_candidate: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let reply = self
                .provider
                .complete(
                    prompts::NEXT_QUERY_SYSTEM,
                    &prompts::next_query_user(
                        &session.original_query,
                        &session.used_queries,
                        &session.accumulated_results,
                    ),
                    &options,
                )
                .await?;

            let candidate = clean_candidate(&reply);
            if candidate.is_empty() {
                tracing::warn!(attempt, "model proposed an empty query");
                continue;
            }

            let verdicts = self
                .is_diverse(std::slice::from_ref(&candidate), &session.used_queries)
                .await?;
            if verdicts.first().copied().unwrap_or(false) {
                tracing::debug!(attempt, query = %candidate, "accepted diverse query");
                session.used_queries.push(candidate.clone());
                return Ok(candidate);
            }

            tracing::debug!(attempt, query = %candidate, "query too similar to earlier ones");
            last_candidate = Some(candidate);
        }

        match last_candidate {
            Some(candidate) => {
                tracing::warn!(
                    attempts = self.max_attempts,
                    "no sufficiently different query found; using the last proposal"
                );
                session.used_queries.push(candidate.clone());
                Ok(candidate)
            }
            None => {
                tracing::warn!("every proposal was empty; keeping the current query");
                Ok(session.current_query().to_owned())
            }
        }
    }

    /// Ask for up to three follow-up queries the user could run next.
    ///
    /// # Errors
    ///
    /// Propagates completion provider failures.
    pub async fn suggest_follow_up_queries(
        &self,
        current_results: &[String],
        prior: &[String],
    ) -> Result<Vec<String>> {
        let options = CompletionOptions::new().with_temperature(PROPOSE_TEMPERATURE);
        let reply = self
            .provider
            .complete(
                prompts::FOLLOW_UP_SYSTEM,
                &prompts::follow_up_user(current_results, prior),
                &options,
            )
            .await?;

        Ok(reply
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(FOLLOW_UP_COUNT)
            .map(str::to_owned)
            .collect())
    }
}

/// Parse `true`/`false` lines into exactly `expected` verdicts.
///
/// Lines other than a bare `true` or `false` (case-insensitive, surrounding
/// whitespace ignored) are skipped. Missing verdicts are `false`.
pub fn parse_verdicts(reply: &str, expected: usize) -> Vec<bool> {
    let mut verdicts: Vec<bool> = reply
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter_map(|line| match line.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
        .take(expected)
        .collect();
    verdicts.resize(expected, false);
    verdicts
}

/// First non-blank line of `reply`, trimmed and stripped of wrapping quotes.
fn clean_candidate(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim())
        .unwrap_or_default()
        .to_owned()
}
