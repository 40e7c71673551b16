//! LlmProvider trait definition.
//!
//! This is the generation backend every chat provider implements.
//! Uses RPITIT for `complete`, and `Pin<Box<dyn Stream>>` for `stream`
//! (streams need to be object-safe for the BoxLlmProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use langchat_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Boxed event stream returned by [`LlmProvider::stream`].
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for chat generation backends (OpenAI, DeepSeek, Ollama, etc.).
///
/// Implementations live in langchat-infra (e.g., `OpenAiCompatibleProvider`).
/// Dropping the returned stream must abort the upstream request; the relay
/// relies on that for cancellation.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "deepseek").
    fn name(&self) -> &str;

    /// What this provider supports.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(&self, request: CompletionRequest) -> LlmEventStream;
}
