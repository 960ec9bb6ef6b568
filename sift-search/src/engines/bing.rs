//! Bing search provider.
//!
//! With a subscription key configured, queries the Bing Web Search API and
//! reads `webPages.value[]`. Without a key it falls back to scraping the
//! public HTML results page.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::engine::SearchProvider;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchHit};

/// Bing search provider (API or HTML).
pub struct BingEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    safe_search: bool,
}

impl BingEngine {
    /// Build a Bing provider from the search configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            endpoint: config.bing_endpoint.clone(),
            api_key: config
                .bing_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            safe_search: config.safe_search,
        })
    }

    async fn search_api(
        &self,
        api_key: &str,
        query: &str,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let count = result_count.to_string();
        let safe_search = if self.safe_search { "Strict" } else { "Off" };

        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", api_key)
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("safeSearch", safe_search),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Bing HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Bing response read failed: {e}")))?;

        parse_bing_api_json(&body, result_count)
    }

    async fn search_html(
        &self,
        query: &str,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let safe_search = if self.safe_search { "Strict" } else { "Off" };

        let response = self
            .client
            .get("https://www.bing.com/search")
            .query(&[("q", query), ("setlang", "en"), ("safeSearch", safe_search)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Bing HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Bing response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "Bing HTML response received");

        parse_bing_html(&html, result_count)
    }
}

#[async_trait]
impl SearchProvider for BingEngine {
    async fn search(
        &self,
        query: &str,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        tracing::trace!(query, api = self.api_key.is_some(), "Bing search");
        match self.api_key.as_deref() {
            Some(key) => self.search_api(key, query, result_count).await,
            None => self.search_html(query, result_count).await,
        }
    }

    fn name(&self) -> &str {
        SearchEngine::Bing.name()
    }
}

#[derive(Debug, Deserialize)]
struct BingApiResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

/// Parse a Bing Web Search API JSON body.
///
/// A response without `webPages` is a valid empty answer; a body that is
/// not JSON, or a page without `name`, is a parse error.
fn parse_bing_api_json(body: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let parsed: BingApiResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Bing API response: {e}")))?;

    let hits: Vec<SearchHit> = parsed
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .take(max_results)
        .map(|page| SearchHit {
            title: page.name,
            url: page.url,
            snippet: page.snippet,
            engine: SearchEngine::Bing.name().to_string(),
        })
        .collect();

    tracing::debug!(count = hits.len(), "Bing API results parsed");
    Ok(hits)
}

/// Parse a Bing HTML results page.
fn parse_bing_html(html: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("li.b_algo")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h2")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".b_caption p, .b_lineclamp2")
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

        let url = title_el
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
            engine: SearchEngine::Bing.name().to_string(),
        });

        if hits.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = hits.len(), "Bing HTML results parsed");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_API_JSON: &str = r#"{
        "_type": "SearchResponse",
        "webPages": {
            "value": [
                {"name": "Best Hiking Boots 2024", "url": "https://gear.example/boots", "snippet": "We tested 40 pairs."},
                {"name": "Boot Fitting Guide", "url": "https://fit.example/guide", "snippet": "How a boot should fit."},
                {"name": "Waterproof Boots", "url": "https://wet.example/", "snippet": "Gore-Tex compared."}
            ]
        }
    }"#;

    const MOCK_BING_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<ol id="b_results">
<li class="b_algo">
  <h2><a href="https://www.rust-lang.org/">Rust Programming Language</a></h2>
  <div class="b_caption"><p>A language empowering everyone to build reliable and efficient software.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://doc.rust-lang.org/book/">The Rust Programming Language Book</a></h2>
  <div class="b_caption"><p>An introductory book about Rust.</p></div>
</li>
</ol>
</body>
</html>"#;

    #[test]
    fn parse_api_json_returns_hits() {
        let hits = parse_bing_api_json(MOCK_API_JSON, 10).expect("should parse");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Best Hiking Boots 2024");
        assert_eq!(hits[0].snippet, "We tested 40 pairs.");
        assert_eq!(hits[0].engine, "Bing");
        assert_eq!(
            hits[0].to_line(),
            "Best Hiking Boots 2024: We tested 40 pairs."
        );
    }

    #[test]
    fn parse_api_json_respects_max_results() {
        let hits = parse_bing_api_json(MOCK_API_JSON, 2).expect("should parse");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn parse_api_json_without_web_pages_is_empty() {
        let hits = parse_bing_api_json(r#"{"_type": "SearchResponse"}"#, 5).expect("ok");
        assert!(hits.is_empty());
    }

    #[test]
    fn parse_api_json_rejects_garbage() {
        let err = parse_bing_api_json("<html>rate limited</html>", 5).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn parse_html_returns_hits() {
        let hits = parse_bing_html(MOCK_BING_HTML, 10).expect("should parse");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].url, "https://www.rust-lang.org/");
        assert!(hits[0].snippet.contains("reliable and efficient"));
    }

    #[test]
    fn parse_html_empty_page_returns_empty() {
        let hits = parse_bing_html("<html><body></body></html>", 10).expect("ok");
        assert!(hits.is_empty());
    }

    #[test]
    fn blank_api_key_falls_back_to_html() {
        let config = SearchConfig {
            bing_api_key: Some("   ".into()),
            ..Default::default()
        };
        let engine = BingEngine::new(&config).expect("client");
        assert!(engine.api_key.is_none());
        assert_eq!(engine.name(), "Bing");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BingEngine>();
    }
}
