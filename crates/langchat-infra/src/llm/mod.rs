//! Generation backend implementations.
//!
//! Contains the OpenAI-compatible chat provider and image provider, plus the
//! factories that turn stored [`ModelConfig`] rows into boxed providers and
//! assemble the runtime [`ProviderRegistry`].

pub mod image;
pub mod openai_compat;

use std::sync::Arc;

use secrecy::SecretString;

use langchat_core::llm::box_provider::BoxLlmProvider;
use langchat_core::llm::image::BoxImageProvider;
use langchat_core::llm::registry::{ChatModel, ImageModel, ProviderRegistry};
use langchat_types::llm::LlmError;
use langchat_types::model::{ModelConfig, ModelKind};

use self::image::OpenAiImageProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, defaults_for};

/// Resolve the vendor defaults for a model row, applying its base URL override.
fn compat_config(model: &ModelConfig) -> Result<OpenAiCompatConfig, LlmError> {
    let api_key = model.api_key.as_deref().filter(|k| !k.trim().is_empty());
    let mut config =
        defaults_for(model.provider, api_key, &model.model).ok_or(LlmError::AuthenticationFailed)?;
    if let Some(base_url) = model.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.base_url = base_url.to_string();
    }
    Ok(config)
}

/// Create a [`BoxLlmProvider`] from a stored chat model.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when a hosted vendor has no API key.
pub fn create_provider(model: &ModelConfig) -> Result<BoxLlmProvider, LlmError> {
    let config = compat_config(model)?;
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(config)))
}

/// Create a [`BoxImageProvider`] from a stored image model.
pub fn create_image_provider(model: &ModelConfig) -> Result<BoxImageProvider, LlmError> {
    let config = compat_config(model)?;
    let provider = OpenAiImageProvider::new(
        config.provider_name,
        config.base_url,
        SecretString::from(config.api_key),
    )?;
    Ok(BoxImageProvider::new(provider))
}

/// Build the runtime registry from stored models.
///
/// Models whose provider cannot be constructed are skipped with a warning.
/// `default_model` names the chat model used when a request picks none.
pub fn build_registry(models: &[ModelConfig], default_model: Option<&str>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for model in models {
        match model.kind {
            ModelKind::Chat => match create_provider(model) {
                Ok(provider) => registry.register_chat(ChatModel {
                    id: model.id.clone(),
                    model: model.model.clone(),
                    temperature: model.temperature,
                    max_tokens: model.max_tokens,
                    provider: Arc::new(provider),
                }),
                Err(e) => {
                    tracing::warn!(model_id = %model.id, error = %e, "skipping chat model");
                }
            },
            ModelKind::Image => match create_image_provider(model) {
                Ok(provider) => registry.register_image(ImageModel {
                    id: model.id.clone(),
                    model: model.model.clone(),
                    size: model.image_size.clone(),
                    provider: Arc::new(provider),
                }),
                Err(e) => {
                    tracing::warn!(model_id = %model.id, error = %e, "skipping image model");
                }
            },
            ModelKind::Embedding => {
                tracing::debug!(model_id = %model.id, "embedding models are not served");
            }
        }
    }

    if let Some(id) = default_model {
        registry.set_default_chat(id);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use langchat_types::llm::ProviderType;

    fn model(id: &str, kind: ModelKind, provider: ProviderType, api_key: Option<&str>) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            provider,
            model: format!("{id}-vendor"),
            base_url: None,
            api_key: api_key.map(str::to_string),
            secret_key: None,
            temperature: Some(0.3),
            max_tokens: Some(512),
            image_size: Some("1024x1024".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_provider_uses_vendor_name() {
        let provider =
            create_provider(&model("ds", ModelKind::Chat, ProviderType::DeepSeek, Some("k"))).unwrap();
        assert_eq!(provider.name(), "deep_seek");
    }

    #[test]
    fn test_create_provider_missing_key() {
        let result = create_provider(&model("oa", ModelKind::Chat, ProviderType::OpenAi, None));
        assert!(matches!(result, Err(LlmError::AuthenticationFailed)));

        let blank = create_provider(&model("oa", ModelKind::Chat, ProviderType::OpenAi, Some(" ")));
        assert!(blank.is_err());
    }

    #[test]
    fn test_base_url_override() {
        let mut m = model("custom", ModelKind::Chat, ProviderType::OpenAi, Some("k"));
        m.base_url = Some("https://proxy.example.com/v1".to_string());
        let config = compat_config(&m).unwrap();
        assert_eq!(config.base_url, "https://proxy.example.com/v1");
    }

    #[test]
    fn test_build_registry_skips_broken_models() {
        let models = vec![
            model("broken", ModelKind::Chat, ProviderType::OpenAi, None),
            model("local", ModelKind::Chat, ProviderType::Ollama, None),
            model("gpt", ModelKind::Chat, ProviderType::OpenAi, Some("k")),
            model("dalle", ModelKind::Image, ProviderType::OpenAi, Some("k")),
            model("embed", ModelKind::Embedding, ProviderType::OpenAi, Some("k")),
        ];

        let registry = build_registry(&models, Some("gpt"));
        assert!(registry.chat(Some("broken")).is_none());
        assert!(registry.chat(Some("local")).is_some());
        assert_eq!(registry.chat(None).unwrap().id, "gpt");
        let image = registry.image("dalle").unwrap();
        assert_eq!(image.size.as_deref(), Some("1024x1024"));
        assert_eq!(registry.chat_ids().len(), 2);
    }
}
