//! Query interpretation: what the user probably wants, and how to ask better.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::llm::{CompletionOptions, CompletionProvider};
use crate::prompts;

const INTERPRET_TEMPERATURE: f64 = 0.7;

/// The model's reading of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInterpretation {
    /// The query as the model understood it was asked.
    pub original_query: String,
    /// What the user is trying to find out.
    pub interpreted_intent: String,
    /// Ways the query could be sharpened.
    pub suggested_improvements: Vec<String>,
    /// Keywords worth focusing on.
    pub search_keywords: Vec<String>,
}

/// Ask `provider` to interpret `query` as a JSON object.
///
/// # Errors
///
/// Returns [`SiftError::Llm`] if the provider fails and [`SiftError::Parse`]
/// if the reply is not a JSON object with every required field.
pub async fn interpret_query(
    provider: &dyn CompletionProvider,
    query: &str,
) -> Result<QueryInterpretation> {
    let options = CompletionOptions::new()
        .with_temperature(INTERPRET_TEMPERATURE)
        .with_json_output(true);
    let reply = provider
        .complete(
            prompts::INTERPRET_SYSTEM,
            &prompts::interpret_user(query),
            &options,
        )
        .await?;
    parse_interpretation(&reply)
}

/// Parse a model reply into a [`QueryInterpretation`].
///
/// A surrounding Markdown code fence is tolerated.
pub fn parse_interpretation(reply: &str) -> Result<QueryInterpretation> {
    serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| SiftError::Parse(format!("query interpretation: {e}")))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
