//! Provider registry for runtime model lookup.
//!
//! A model-id indexed registry of boxed chat and image providers, built once
//! at startup from the configured models and shared read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use super::box_provider::BoxLlmProvider;
use super::image::BoxImageProvider;

/// A chat model ready to serve requests.
pub struct ChatModel {
    /// Model registry id (the key clients send as `modelId`).
    pub id: String,
    /// Vendor model name placed in the completion request.
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub provider: Arc<BoxLlmProvider>,
}

/// An image model ready to serve requests.
pub struct ImageModel {
    pub id: String,
    pub model: String,
    pub size: Option<String>,
    pub provider: Arc<BoxImageProvider>,
}

/// Registry of available models, indexed by id.
///
/// The first chat model registered becomes the default unless
/// [`ProviderRegistry::set_default_chat`] names another.
#[derive(Default)]
pub struct ProviderRegistry {
    chat: HashMap<String, Arc<ChatModel>>,
    image: HashMap<String, Arc<ImageModel>>,
    default_chat: Option<String>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat model. Replaces any model with the same id.
    pub fn register_chat(&mut self, model: ChatModel) {
        if self.default_chat.is_none() {
            self.default_chat = Some(model.id.clone());
        }
        self.chat.insert(model.id.clone(), Arc::new(model));
    }

    /// Register an image model. Replaces any model with the same id.
    pub fn register_image(&mut self, model: ImageModel) {
        self.image.insert(model.id.clone(), Arc::new(model));
    }

    /// Name the chat model used when a request does not pick one.
    ///
    /// Ignored when no chat model with that id is registered.
    pub fn set_default_chat(&mut self, id: &str) {
        if self.chat.contains_key(id) {
            self.default_chat = Some(id.to_string());
        } else {
            tracing::warn!(model_id = %id, "default model is not registered, keeping previous default");
        }
    }

    /// Look up a chat model by id, falling back to the default when `id` is `None`.
    pub fn chat(&self, id: Option<&str>) -> Option<Arc<ChatModel>> {
        let id = id.or(self.default_chat.as_deref())?;
        self.chat.get(id).cloned()
    }

    /// Look up an image model by id.
    pub fn image(&self, id: &str) -> Option<Arc<ImageModel>> {
        self.image.get(id).cloned()
    }

    /// Registered chat model ids.
    pub fn chat_ids(&self) -> Vec<&str> {
        self.chat.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{LlmEventStream, LlmProvider};
    use langchat_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities,
    };

    struct NullProvider {
        capabilities: ProviderCapabilities,
    }

    impl LlmProvider for NullProvider {
        fn name(&self) -> &str {
            "null"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::InvalidRequest("unused".to_string()))
        }

        fn stream(&self, _request: CompletionRequest) -> LlmEventStream {
            Box::pin(futures_util::stream::empty())
        }
    }

    fn chat_model(id: &str) -> ChatModel {
        ChatModel {
            id: id.to_string(),
            model: format!("{id}-vendor"),
            temperature: None,
            max_tokens: None,
            provider: Arc::new(BoxLlmProvider::new(NullProvider {
                capabilities: ProviderCapabilities {
                    streaming: true,
                    vision: false,
                    max_context_tokens: 8_192,
                    max_output_tokens: 1_024,
                },
            })),
        }
    }

    #[test]
    fn first_registered_chat_model_is_default() {
        let mut registry = ProviderRegistry::new();
        registry.register_chat(chat_model("a"));
        registry.register_chat(chat_model("b"));

        assert_eq!(registry.chat(None).unwrap().id, "a");
        assert_eq!(registry.chat(Some("b")).unwrap().model, "b-vendor");
    }

    #[test]
    fn set_default_chat_requires_registered_id() {
        let mut registry = ProviderRegistry::new();
        registry.register_chat(chat_model("a"));
        registry.register_chat(chat_model("b"));

        registry.set_default_chat("missing");
        assert_eq!(registry.chat(None).unwrap().id, "a");

        registry.set_default_chat("b");
        assert_eq!(registry.chat(None).unwrap().id, "b");
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let registry = ProviderRegistry::new();
        assert!(registry.chat(None).is_none());
        assert!(registry.chat(Some("x")).is_none());
        assert!(registry.image("x").is_none());
    }
}
