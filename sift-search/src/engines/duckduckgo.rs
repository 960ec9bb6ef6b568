//! DuckDuckGo search provider.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`,
//! which needs no JavaScript and no API key.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::engine::SearchProvider;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchHit};

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML search provider.
pub struct DuckDuckGoEngine {
    client: reqwest::Client,
    endpoint: String,
    safe_search: bool,
}

impl DuckDuckGoEngine {
    /// Build a DuckDuckGo provider from the search configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            endpoint: DDG_HTML_ENDPOINT.to_owned(),
            safe_search: config.safe_search,
        })
    }

    /// Point the provider at a different HTML endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Extract the target URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoEngine {
    async fn search(
        &self,
        query: &str,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let mut params = vec![("q", query)];
        if self.safe_search {
            params.push(("kp", "1"));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, result_count)
    }

    fn name(&self) -> &str {
        SearchEngine::DuckDuckGo.name()
    }
}

/// Parse a DuckDuckGo HTML results page, skipping ads.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoEngine::extract_url)
        else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
            engine: SearchEngine::DuckDuckGo.name().to_string(),
        });

        if hits.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}
