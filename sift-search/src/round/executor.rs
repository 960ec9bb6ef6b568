//! One search round: cache read-through, concurrent provider fan-out,
//! exact-text merge, cache write-through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::ResultCache;
use crate::config::SearchConfig;
use crate::engine::SearchProvider;
use crate::error::SearchError;
use crate::types::{ResultSet, SearchHit};

use super::dedup::dedup_exact;

/// Anything that can turn one query into a round's result set.
///
/// The refinement loop depends on this seam rather than on
/// [`SearchRoundExecutor`] directly.
#[async_trait]
pub trait SearchRound: Send + Sync {
    /// Run one round for `query`. Never fails: provider problems degrade to
    /// fewer (or zero) results.
    async fn execute(&self, query: &str) -> ResultSet;
}

/// Fetches, merges and caches the results of a single query.
pub struct SearchRoundExecutor {
    providers: Vec<Arc<dyn SearchProvider>>,
    cache: Arc<ResultCache>,
    results_per_provider: usize,
    timeout: Duration,
}

impl SearchRoundExecutor {
    /// Create an executor over `providers`, sized and timed by `config`.
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        cache: Arc<ResultCache>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            providers,
            cache,
            results_per_provider: config.results_per_provider,
            timeout: config.timeout(),
        }
    }

    /// Override the per-provider timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The cache this executor reads and writes.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Query every provider concurrently and merge what comes back.
    ///
    /// Does not touch the cache.
    pub async fn fetch_fresh(&self, query: &str) -> ResultSet {
        let calls = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            async move {
                let outcome =
                    query_provider(provider.as_ref(), query, self.results_per_provider, self.timeout)
                        .await;
                (provider.name().to_owned(), outcome)
            }
        });

        let outcomes = futures::future::join_all(calls).await;
        merge_outcomes(outcomes)
    }
}

#[async_trait]
impl SearchRound for SearchRoundExecutor {
    async fn execute(&self, query: &str) -> ResultSet {
        if let Some(entry) = self.cache.get(query).await {
            tracing::debug!(query, results = entry.results.len(), "round served from cache");
            return entry.results;
        }

        let merged = self.fetch_fresh(query).await;

        if let Err(e) = self.cache.put(query, merged.clone()).await {
            tracing::warn!(error = %e, "failed to cache round results");
        }

        merged
    }
}

/// Run one provider call bounded by `timeout`.
async fn query_provider(
    provider: &dyn SearchProvider,
    query: &str,
    result_count: usize,
    timeout: Duration,
) -> Result<Vec<SearchHit>, SearchError> {
    match tokio::time::timeout(timeout, provider.search(query, result_count)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SearchError::Timeout(format!(
            "{} exceeded {}s",
            provider.name(),
            timeout.as_secs()
        ))),
    }
}

/// Merge per-provider outcomes. A failed provider contributes nothing.
fn merge_outcomes(outcomes: Vec<(String, Result<Vec<SearchHit>, SearchError>)>) -> ResultSet {
    let mut lines = Vec::new();
    for (provider, outcome) in outcomes {
        match outcome {
            Ok(hits) => {
                tracing::debug!(%provider, count = hits.len(), "provider returned results");
                lines.extend(hits.iter().map(SearchHit::to_line));
            }
            Err(err) => {
                tracing::warn!(%provider, error = %err, "provider failed; treating as empty");
            }
        }
    }
    dedup_exact(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        name: &'static str,
        lines: Vec<(&'static str, &'static str)>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(name: &'static str, lines: Vec<(&'static str, &'static str)>) -> Arc<Self> {
            Arc::new(Self {
                name,
                lines,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                lines: vec![],
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        async fn search(
            &self,
            _query: &str,
            result_count: usize,
        ) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::Http("connection reset".into()));
            }
            Ok(self
                .lines
                .iter()
                .take(result_count)
                .map(|(title, snippet)| SearchHit {
                    title: (*title).into(),
                    url: String::new(),
                    snippet: (*snippet).into(),
                    engine: self.name.into(),
                })
                .collect())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl SearchProvider for HangingProvider {
        async fn search(&self, _query: &str, _n: usize) -> Result<Vec<SearchHit>, SearchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    fn executor(
        dir: &tempfile::TempDir,
        providers: Vec<Arc<dyn SearchProvider>>,
    ) -> SearchRoundExecutor {
        let cache = Arc::new(ResultCache::open_without_sweep(dir.path()).expect("cache"));
        SearchRoundExecutor::new(providers, cache, &SearchConfig::default())
    }

    fn dynp(provider: Arc<CountingProvider>) -> Arc<dyn SearchProvider> {
        provider
    }

    fn as_set(lines: &[String]) -> HashSet<String> {
        lines.iter().cloned().collect()
    }

    #[tokio::test]
    async fn merges_and_dedups_exact_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = CountingProvider::new("one", vec![("A", "x"), ("B", "y")]);
        let b = CountingProvider::new("two", vec![("B", "y"), ("C", "z")]);
        let exec = executor(&dir, vec![dynp(a), dynp(b)]);

        let results = exec.execute("q").await;
        assert_eq!(results.len(), 3);
        let expected: HashSet<String> = ["A: x", "B: y", "C: z"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(as_set(&results), expected);
    }

    #[tokio::test]
    async fn cache_hit_makes_zero_provider_calls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = CountingProvider::new("one", vec![("A", "x")]);
        let exec = executor(&dir, vec![dynp(a.clone())]);

        let first = exec.execute("repeat me").await;
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);

        let second = exec.execute("repeat me").await;
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(as_set(&first), as_set(&second));
    }

    #[tokio::test]
    async fn failing_provider_degrades_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = CountingProvider::new("ok", vec![("A", "x")]);
        let bad = CountingProvider::failing("bad");
        let exec = executor(&dir, vec![dynp(ok), dynp(bad.clone())]);

        let results = exec.execute("q").await;
        assert_eq!(results, vec!["A: x".to_string()]);
        assert_eq!(bad.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_providers_failing_caches_empty_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = CountingProvider::failing("bad");
        let exec = executor(&dir, vec![dynp(bad.clone())]);

        assert!(exec.execute("q").await.is_empty());
        let entry = exec.cache().get("q").await.expect("empty set is cached");
        assert!(entry.results.is_empty());

        // Present-but-empty is a hit: no second provider call.
        assert!(exec.execute("q").await.is_empty());
        assert_eq!(bad.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hanging_provider_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = CountingProvider::new("ok", vec![("A", "x")]);
        let exec = executor(&dir, vec![dynp(ok), Arc::new(HangingProvider) as Arc<dyn SearchProvider>])
            .with_timeout(Duration::from_millis(50));

        let results = exec.execute("q").await;
        assert_eq!(results, vec!["A: x".to_string()]);
    }

    #[tokio::test]
    async fn result_count_is_passed_to_providers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let many = CountingProvider::new(
            "many",
            vec![("1", "a"), ("2", "b"), ("3", "c"), ("4", "d"), ("5", "e"), ("6", "f")],
        );
        let exec = executor(&dir, vec![dynp(many)]);
        assert_eq!(exec.execute("q").await.len(), 5);
    }

    #[test]
    fn merge_maps_errors_to_empty() {
        let outcomes = vec![
            ("a".to_string(), Err(SearchError::Parse("bad json".into()))),
            ("b".to_string(), Err(SearchError::Timeout("slow".into()))),
        ];
        assert!(merge_outcomes(outcomes).is_empty());
    }
}
