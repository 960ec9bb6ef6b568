//! Configuration types for sift.
//!
//! Loaded once at process start from a TOML file (every field optional),
//! then completed from the environment by [`SiftConfig::resolve_secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_search::{SearchConfig, SearchEngine};

use crate::error::{Result, SiftError};
use crate::llm::OpenAiCompatConfig;
use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Completion provider settings.
    pub llm: LlmConfig,
    /// Search provider settings.
    pub search: SearchSettings,
    /// Result cache settings.
    pub cache: CacheConfig,
    /// Refinement loop settings.
    pub refinement: RefinementConfig,
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_url: String,
    /// Model name.
    pub api_model: String,
    /// API key. Usually left unset and read from `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,
    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_owned(),
            api_model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            api_key_env: "DEEPSEEK_API_KEY".to_owned(),
            timeout_seconds: 60,
        }
    }
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Providers queried every round.
    pub engines: Vec<SearchEngine>,
    /// Bing Web Search API endpoint.
    pub bing_endpoint: String,
    /// Environment variable that overrides `bing_endpoint` when set.
    pub bing_endpoint_env: String,
    /// Bing subscription key. Usually left unset and read from `bing_api_key_env`.
    pub bing_api_key: Option<String>,
    /// Environment variable consulted when `bing_api_key` is unset.
    pub bing_api_key_env: String,
    /// Results requested from each provider per round.
    pub results_per_search: usize,
    /// Per-provider timeout in seconds.
    pub timeout_seconds: u64,
    /// Request safe search filtering.
    pub safe_search: bool,
    /// Fixed User-Agent (None = rotate).
    pub user_agent: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let base = SearchConfig::default();
        Self {
            engines: base.engines,
            bing_endpoint: base.bing_endpoint,
            bing_endpoint_env: "BING_ENDPOINT".to_owned(),
            bing_api_key: None,
            bing_api_key_env: "BING_API_KEY".to_owned(),
            results_per_search: base.results_per_provider,
            timeout_seconds: base.timeout_seconds,
            safe_search: base.safe_search,
            user_agent: None,
        }
    }
}

impl SearchSettings {
    /// Convert to the search crate's runtime configuration.
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            engines: self.engines.clone(),
            results_per_provider: self.results_per_search,
            timeout_seconds: self.timeout_seconds,
            safe_search: self.safe_search,
            user_agent: self.user_agent.clone(),
            bing_endpoint: self.bing_endpoint.clone(),
            bing_api_key: self.bing_api_key.clone(),
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one JSON record per query.
    pub dir: PathBuf,
    /// Records older than this are deleted at startup.
    pub max_age_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: crate::sift_dirs::results_cache_dir(),
            max_age_days: 7,
        }
    }
}

impl CacheConfig {
    /// Retention window as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(24 * 60 * 60))
    }
}

/// Refinement loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Search rounds per session.
    pub max_rounds: usize,
    /// Query proposals tried per round before accepting a similar one.
    pub max_proposal_attempts: usize,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            max_proposal_attempts: 3,
        }
    }
}

impl SiftConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SiftError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/sift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::sift_dirs::config_file()
    }

    /// Load `path` if given, else the default path if it exists, else defaults.
    ///
    /// An explicitly given path that does not exist is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    tracing::debug!(path = %default_path.display(), "loading config");
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Fill unset credentials from the process environment.
    ///
    /// Call [`dotenvy::dotenv`] first to pick up a `.env` file.
    pub fn resolve_secrets(&mut self) {
        self.resolve_secrets_with(|name| std::env::var(name).ok());
    }

    /// Fill unset credentials using `lookup` for environment variables.
    ///
    /// Values already present in the file win over the environment, except
    /// for the Bing endpoint, which the environment overrides.
    pub fn resolve_secrets_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |v: String| (!v.trim().is_empty()).then_some(v);

        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup(&self.llm.api_key_env).and_then(non_blank);
        }
        if self.search.bing_api_key.is_none() {
            self.search.bing_api_key = lookup(&self.search.bing_api_key_env).and_then(non_blank);
        }
        if let Some(endpoint) = lookup(&self.search.bing_endpoint_env).and_then(non_blank) {
            self.search.bing_endpoint = endpoint;
        }
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.llm.api_url).is_err() {
            return Err(SiftError::Config(format!(
                "llm.api_url is not a valid URL: {}",
                self.llm.api_url
            )));
        }
        if self.llm.api_model.trim().is_empty() {
            return Err(SiftError::Config("llm.api_model must not be empty".into()));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(SiftError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.cache.max_age_days == 0 {
            return Err(SiftError::Config(
                "cache.max_age_days must be greater than 0".into(),
            ));
        }
        if self.refinement.max_rounds == 0 {
            return Err(SiftError::Config(
                "refinement.max_rounds must be greater than 0".into(),
            ));
        }
        if self.refinement.max_proposal_attempts == 0 {
            return Err(SiftError::Config(
                "refinement.max_proposal_attempts must be greater than 0".into(),
            ));
        }
        self.search
            .to_search_config()
            .validate()
            .map_err(|e| SiftError::Config(format!("search: {e}")))
    }

    /// Completion client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Config`] if no API key was configured or found
    /// in the environment.
    pub fn llm_client_config(&self) -> Result<OpenAiCompatConfig> {
        let key = self.llm.api_key.clone().ok_or_else(|| {
            SiftError::Config(format!(
                "no API key: set llm.api_key or the {} environment variable",
                self.llm.api_key_env
            ))
        })?;
        Ok(OpenAiCompatConfig::new(key)
            .with_base_url(self.llm.api_url.clone())
            .with_model(self.llm.api_model.clone())
            .with_timeout(Duration::from_secs(self.llm.timeout_seconds)))
    }
}
