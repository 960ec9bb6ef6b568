//! Request options for a single completion.

use serde::{Deserialize, Serialize};

/// Per-request generation parameters.
///
/// # Examples
///
/// ```
/// use sift::llm::CompletionOptions;
///
/// let opts = CompletionOptions::new()
///     .with_temperature(0.1)
///     .with_max_tokens(64);
///
/// assert_eq!(opts.temperature, Some(0.1));
/// assert!(!opts.json_output);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Sampling temperature. `None` means use provider default.
    pub temperature: Option<f64>,
    /// Ask the provider for a JSON object instead of free text.
    pub json_output: bool,
    /// Maximum tokens to generate. `None` means use provider default.
    pub max_tokens: Option<usize>,
}

impl CompletionOptions {
    /// Create options with provider defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request structured JSON output.
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}
