//! Chat service for the request/response endpoints.
//!
//! ChatService covers everything around the streaming relay: loading app
//! info, listing and cleaning conversation history, and template-driven
//! single-shot generation (mind maps, images). History and app-info calls
//! re-initialize conversation memory as a side effect.

use std::sync::Arc;

use tracing::{debug, info};

use langchat_types::app::App;
use langchat_types::chat::{ChatMessage, ConversationId, Message};
use langchat_types::error::ChatError;
use langchat_types::image::{GeneratedImage, ImageRequest};
use langchat_types::llm::CompletionRequest;
use langchat_types::model::{ModelConfig, ModelKind};

use crate::chat::repository::ConversationStore;
use crate::llm::registry::ProviderRegistry;
use crate::memory::MemoryCache;
use crate::prompt;
use crate::repository::app::AppRepository;
use crate::repository::model::ModelRepository;

/// Orchestrates non-streaming chat operations.
///
/// Generic over the repositories so langchat-core never depends on
/// langchat-infra.
pub struct ChatService<S: ConversationStore, A: AppRepository, M: ModelRepository> {
    store: Arc<S>,
    apps: Arc<A>,
    models: Arc<M>,
    memory: Arc<MemoryCache>,
    providers: Arc<ProviderRegistry>,
}

impl<S: ConversationStore, A: AppRepository, M: ModelRepository> ChatService<S, A, M> {
    pub fn new(
        store: Arc<S>,
        apps: Arc<A>,
        models: Arc<M>,
        memory: Arc<MemoryCache>,
        providers: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            store,
            apps,
            models,
            memory,
            providers,
        }
    }

    /// Load an app and seed memory with its system prompt.
    ///
    /// A blank `conversation_id` defaults to the app id. Memory is only
    /// touched when the app has a non-blank prompt.
    pub async fn app_info(
        &self,
        app_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<App, ChatError> {
        let app = self
            .apps
            .get(app_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(format!("app '{app_id}'")))?;

        let conversation = match conversation_id.filter(|c| !c.trim().is_empty()) {
            Some(c) => ConversationId::from(c),
            None => ConversationId::from(app.id.as_str()),
        };

        if let Some(prompt) = app.system_prompt() {
            self.memory.init_system(&conversation, prompt);
            debug!(app_id = %app.id, conversation_id = %conversation, "memory initialized from app prompt");
        }

        Ok(app)
    }

    /// List the caller's messages and re-initialize memory from the most
    /// recent of them.
    pub async fn history(
        &self,
        conversation_id: &ConversationId,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self.store.list(conversation_id, Some(user_id)).await?;

        self.memory.init_history(
            conversation_id,
            messages.iter().map(ChatMessage::to_memory_message),
        );
        debug!(
            conversation_id = %conversation_id,
            persisted = messages.len(),
            "memory initialized from history"
        );

        Ok(messages)
    }

    /// Remove persisted messages and cached memory for a conversation.
    ///
    /// Waits for a turn in flight on the same conversation to finish, so its
    /// assistant message cannot land after the clear.
    pub async fn clean(&self, conversation_id: &ConversationId) -> Result<u64, ChatError> {
        let _turn = self.memory.begin_turn(conversation_id).await;
        let removed = self.store.clear(conversation_id).await?;
        self.memory.clean(conversation_id);
        info!(conversation_id = %conversation_id, removed, "conversation cleaned");
        Ok(removed)
    }

    /// Generate a Markdown mind map for `message` with a single-shot completion.
    pub async fn mindmap(&self, message: &str, model_id: Option<&str>) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidRequest("message is required".to_string()));
        }
        let model = self
            .providers
            .chat(model_id.filter(|id| !id.trim().is_empty()))
            .ok_or_else(|| ChatError::InvalidRequest("no chat model available".to_string()))?;

        let request = CompletionRequest {
            model: model.model.clone(),
            messages: vec![Message::user(prompt::build(message, prompt::MINDMAP))],
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            stream: false,
        };

        let response = model
            .provider
            .complete(&request)
            .await
            .map_err(|e| ChatError::BackendFailure(e.to_string()))?;

        info!(
            model = %model.id,
            output_tokens = response.usage.output_tokens,
            "mindmap generated"
        );
        Ok(response.content)
    }

    /// Generate images for `message` with the image model `model_id`.
    pub async fn image(
        &self,
        message: &str,
        model_id: &str,
    ) -> Result<Vec<GeneratedImage>, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidRequest("message is required".to_string()));
        }
        let model = self
            .providers
            .image(model_id)
            .ok_or_else(|| ChatError::InvalidRequest(format!("unknown image model '{model_id}'")))?;

        let request = ImageRequest {
            model: model.model.clone(),
            prompt: prompt::build(message, prompt::IMAGE),
            size: model.size.clone(),
            n: 1,
        };

        let images = model
            .provider
            .generate(&request)
            .await
            .map_err(|e| ChatError::BackendFailure(e.to_string()))?;

        info!(model = %model.id, count = images.len(), "images generated");
        Ok(images)
    }

    /// Image-capable models with credentials removed.
    pub async fn image_models(&self) -> Result<Vec<ModelConfig>, ChatError> {
        let models = self.models.list(Some(ModelKind::Image)).await?;
        Ok(models.into_iter().map(ModelConfig::redacted).collect())
    }
}
