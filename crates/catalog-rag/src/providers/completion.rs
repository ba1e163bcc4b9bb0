//! Chat completion provider trait for generating answers

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// Trait for LLM chat completion
///
/// Implementations:
/// - `OllamaCompletion`: Ollama server (phi3, llama3.2, ...)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a conversation and return the top response text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
