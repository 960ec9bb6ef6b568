//! Error types for the sift-search crate.
//!
//! All errors use stable string messages suitable for display to users.
//! No API keys or query text appear in error messages.

/// Errors that can occur while searching or touching the result cache.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A provider call did not finish within the request timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a search provider failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider response (HTML or JSON).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Reading or writing the on-disk result cache failed.
    #[error("cache error: {0}")]
    Cache(String),
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 10s limit".into());
        assert_eq!(err.to_string(), "search timed out: exceeded 10s limit");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("missing webPages".into());
        assert_eq!(err.to_string(), "parse error: missing webPages");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("results_per_provider must be > 0".into());
        assert_eq!(
            err.to_string(),
            "config error: results_per_provider must be > 0"
        );
    }

    #[test]
    fn display_cache() {
        let err = SearchError::Cache("permission denied".into());
        assert_eq!(err.to_string(), "cache error: permission denied");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
