//! Search provider implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchProvider`].

pub mod bing;
pub mod duckduckgo;

use std::sync::Arc;

pub use bing::BingEngine;
pub use duckduckgo::DuckDuckGoEngine;

use crate::config::SearchConfig;
use crate::engine::SearchProvider;
use crate::error::SearchError;
use crate::types::SearchEngine;

/// Instantiate one provider per engine listed in `config.engines`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration, or
/// [`SearchError::Http`] if an HTTP client cannot be built.
pub fn build_providers(config: &SearchConfig) -> Result<Vec<Arc<dyn SearchProvider>>, SearchError> {
    config.validate()?;
    config
        .engines
        .iter()
        .map(|engine| -> Result<Arc<dyn SearchProvider>, SearchError> {
            match engine {
                SearchEngine::Bing => Ok(Arc::new(BingEngine::new(config)?)),
                SearchEngine::DuckDuckGo => Ok(Arc::new(DuckDuckGoEngine::new(config)?)),
            }
        })
        .collect()
}
