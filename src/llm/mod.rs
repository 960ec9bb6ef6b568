//! Completion provider abstraction and the OpenAI-compatible client.

pub mod error;
pub mod openai;
pub mod provider;
pub mod types;

pub use error::LlmError;
pub use openai::{OpenAiCompatClient, OpenAiCompatConfig};
pub use provider::CompletionProvider;
pub use types::CompletionOptions;
