//! Final summary over everything a session collected.

use crate::error::Result;
use crate::llm::{CompletionOptions, CompletionProvider};
use crate::prompts;

const SUMMARY_TEMPERATURE: f64 = 0.7;

/// Ask `provider` for a summary answering `original_query` from `results`.
///
/// # Errors
///
/// Propagates completion provider failures.
pub async fn generate_summary(
    provider: &dyn CompletionProvider,
    original_query: &str,
    results: &[String],
) -> Result<String> {
    tracing::debug!(results = results.len(), "generating summary");
    let options = CompletionOptions::new().with_temperature(SUMMARY_TEMPERATURE);
    let reply = provider
        .complete(
            prompts::SUMMARY_SYSTEM,
            &prompts::summary_user(original_query, results),
            &options,
        )
        .await?;
    Ok(reply.trim().to_owned())
}
