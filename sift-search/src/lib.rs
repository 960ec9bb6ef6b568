//! # sift-search
//!
//! Multi-provider web search with a content-addressed, on-disk result cache.
//!
//! ## Design
//!
//! - Queries Bing (Web Search API, or its HTML page without a key) and
//!   DuckDuckGo (HTML endpoint) concurrently
//! - Merges provider output into `"title: snippet"` lines, deduplicated by
//!   exact text
//! - Caches each query's merged lines in one JSON file named by the SHA-256
//!   of the query; expired records are swept when the cache is opened
//! - Graceful degradation: a failing or slow provider contributes nothing,
//!   it never aborts a round
//!
//! ## Security
//!
//! - Queries are logged only at trace/debug level
//! - API keys never appear in error messages

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod round;
pub mod types;

use std::sync::Arc;

pub use cache::{CacheEntry, ResultCache};
pub use config::SearchConfig;
pub use engine::SearchProvider;
pub use error::{Result, SearchError};
pub use round::{SearchRound, SearchRoundExecutor};
pub use types::{ResultSet, SearchEngine, SearchHit};

/// Build a round executor over the providers named in `config`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, or
/// [`SearchError::Http`] if an HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> sift_search::Result<()> {
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sift_search::{ResultCache, SearchConfig, SearchRound};
///
/// let cache = Arc::new(ResultCache::open("/tmp/sift-cache", Duration::from_secs(7 * 86_400))?);
/// let executor = sift_search::build_executor(&SearchConfig::default(), cache)?;
/// for line in executor.execute("rust programming").await {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn build_executor(config: &SearchConfig, cache: Arc<ResultCache>) -> Result<SearchRoundExecutor> {
    let providers = engines::build_providers(config)?;
    Ok(SearchRoundExecutor::new(providers, cache, config))
}
