//! Error types for the completion client.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`LlmError::code()`].

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the completion provider failed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";

    /// The provider answered, but not with a usable completion.
    pub const RESPONSE_INVALID: &str = "RESPONSE_INVALID";
}

/// Errors produced by a [`CompletionProvider`](super::CompletionProvider).
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Authentication failed (invalid/missing API key).
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// Request to the completion provider failed.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Request timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),

    /// Provider-specific error not covered by other variants.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),

    /// Response body had no completion text.
    #[error("[{}] {}", error_codes::RESPONSE_INVALID, .0)]
    ResponseInvalid(String),
}

impl LlmError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
            Self::ResponseInvalid(_) => error_codes::RESPONSE_INVALID,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::AuthError(m)
            | Self::RequestError(m)
            | Self::TimeoutError(m)
            | Self::ProviderError(m)
            | Self::ResponseInvalid(m) => m,
        }
    }

    /// Returns true if this error represents a transient failure that can be retried.
    ///
    /// Nothing in this crate retries automatically; the interactive loop uses
    /// this to word its error message.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::AuthError(_) => false,
            Self::RequestError(_) | Self::TimeoutError(_) | Self::ProviderError(_) => true,
            // A malformed body usually repeats on retry.
            Self::ResponseInvalid(_) => false,
        }
    }
}
