//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which providers are queried, how many results
//! each returns, timeouts and Bing API credentials.

use std::time::Duration;

use crate::error::SearchError;
use crate::types::SearchEngine;

/// Default Bing Web Search API endpoint.
pub const DEFAULT_BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

/// Configuration for the search providers of one process.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Which providers to query. Queried concurrently; results are merged.
    pub engines: Vec<SearchEngine>,
    /// Number of results requested from each provider.
    pub results_per_provider: usize,
    /// Per-provider request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to request safe search filtering.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list.
    pub user_agent: Option<String>,
    /// Bing Web Search API endpoint.
    pub bing_endpoint: String,
    /// Bing subscription key. Without one Bing falls back to its HTML page.
    pub bing_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engines: vec![SearchEngine::Bing, SearchEngine::DuckDuckGo],
            results_per_provider: 5,
            timeout_seconds: 10,
            safe_search: true,
            user_agent: None,
            bing_endpoint: DEFAULT_BING_ENDPOINT.to_owned(),
            bing_api_key: None,
        }
    }
}

impl SearchConfig {
    /// Per-provider request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `results_per_provider` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `engines` must not be empty
    /// - `bing_endpoint` must be an absolute URL when Bing is enabled
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.results_per_provider == 0 {
            return Err(SearchError::Config(
                "results_per_provider must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.engines.is_empty() {
            return Err(SearchError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        if self.engines.contains(&SearchEngine::Bing)
            && url::Url::parse(&self.bing_endpoint).is_err()
        {
            return Err(SearchError::Config(format!(
                "bing_endpoint is not a valid URL: {}",
                self.bing_endpoint
            )));
        }
        Ok(())
    }
}
