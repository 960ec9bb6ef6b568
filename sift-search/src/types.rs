//! Core types for search hits, round result sets and engine identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The merged, deduplicated output of one search round.
///
/// Each entry is an opaque `"title: snippet"` line. Order is not part of
/// the contract; compare as sets.
pub type ResultSet = Vec<String>;

/// A single hit returned by a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result, when the provider exposes one.
    pub url: String,
    /// A short text snippet summarising the page.
    pub snippet: String,
    /// Which provider returned this hit.
    pub engine: String,
}

impl SearchHit {
    /// Render this hit as the opaque text line used for dedup and caching.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.title, self.snippet)
    }
}

/// Supported search providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// DuckDuckGo HTML endpoint; no API key required.
    DuckDuckGo,
    /// Bing: Web Search API when a key is configured, HTML otherwise.
    Bing,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Bing => "Bing",
        }
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::DuckDuckGo, Self::Bing]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
