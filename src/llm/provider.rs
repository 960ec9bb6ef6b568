//! The completion provider seam.

use async_trait::async_trait;

use super::error::LlmError;
use super::types::CompletionOptions;

/// A chat model that turns one system + user prompt pair into text.
///
/// Everything above this trait treats the returned text as untrusted input.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the provider name (e.g. `"deepseek"`).
    fn name(&self) -> &str;

    /// Run one non-streaming completion and return the assistant text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}
