//! Trait definition for pluggable search providers.
//!
//! Each provider (Bing, DuckDuckGo) implements [`SearchProvider`] so the
//! round executor can fan a query out to all of them uniformly.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::SearchHit;

/// A pluggable search backend.
///
/// Implementors own their HTTP client and handle URL construction, request
/// headers and response parsing. A failure of any kind is returned as a
/// [`SearchError`]; the round executor decides how to degrade.
///
/// All implementations must be `Send + Sync` for concurrent queries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search and return at most `result_count` hits.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the provider answers
    /// with an error status, or the response cannot be parsed.
    async fn search(&self, query: &str, result_count: usize)
        -> Result<Vec<SearchHit>, SearchError>;

    /// Human-readable provider name used in logs.
    fn name(&self) -> &str;
}
