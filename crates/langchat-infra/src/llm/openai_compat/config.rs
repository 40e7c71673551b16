//! Configuration types and per-vendor defaults for OpenAI-compatible providers.
//!
//! Every supported vendor speaks the OpenAI chat completions protocol. Each
//! gets a factory function returning an [`OpenAiCompatConfig`] with the
//! correct base URL and capabilities.

use langchat_types::llm::{ProviderCapabilities, ProviderType};

/// Configuration for an OpenAI-compatible provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "deep_seek").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier used when a request leaves it empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

fn capabilities(vision: bool, max_context_tokens: u32, max_output_tokens: u32) -> ProviderCapabilities {
    ProviderCapabilities {
        streaming: true,
        vision,
        max_context_tokens,
        max_output_tokens,
    }
}

fn vendor(
    provider_name: &str,
    base_url: &str,
    api_key: &str,
    model: &str,
    capabilities: ProviderCapabilities,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: provider_name.into(),
        base_url: base_url.into(),
        api_key: api_key.into(),
        model: model.into(),
        capabilities,
    }
}

/// OpenAI. Base URL: `https://api.openai.com/v1`.
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    vendor(
        "openai",
        "https://api.openai.com/v1",
        api_key,
        model,
        capabilities(true, 128_000, 16_384),
    )
}

/// DeepSeek. Base URL: `https://api.deepseek.com/v1`.
pub fn deepseek_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    vendor(
        "deep_seek",
        "https://api.deepseek.com/v1",
        api_key,
        model,
        capabilities(false, 64_000, 8_192),
    )
}

/// Zhipu GLM. Base URL: `https://open.bigmodel.cn/api/paas/v4`.
pub fn zhipu_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    vendor(
        "zhipu",
        "https://open.bigmodel.cn/api/paas/v4",
        api_key,
        model,
        capabilities(false, 128_000, 4_096),
    )
}

/// Alibaba Qwen (DashScope compatible mode).
pub fn qwen_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    vendor(
        "qwen",
        "https://dashscope.aliyuncs.com/compatible-mode/v1",
        api_key,
        model,
        capabilities(false, 131_072, 8_192),
    )
}

/// Local Ollama. The server ignores the key but the client requires one.
pub fn ollama_defaults(model: &str) -> OpenAiCompatConfig {
    vendor(
        "ollama",
        "http://localhost:11434/v1",
        "ollama",
        model,
        capabilities(false, 8_192, 4_096),
    )
}

/// Google Gemini (OpenAI-compatible beta endpoint).
pub fn gemini_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    vendor(
        "gemini",
        "https://generativelanguage.googleapis.com/v1beta/openai",
        api_key,
        model,
        capabilities(true, 1_000_000, 65_536),
    )
}

/// Defaults for `provider`. A `None` key is only accepted for Ollama.
pub fn defaults_for(
    provider: ProviderType,
    api_key: Option<&str>,
    model: &str,
) -> Option<OpenAiCompatConfig> {
    let config = match provider {
        ProviderType::Ollama => ollama_defaults(model),
        ProviderType::OpenAi => openai_defaults(api_key?, model),
        ProviderType::DeepSeek => deepseek_defaults(api_key?, model),
        ProviderType::Zhipu => zhipu_defaults(api_key?, model),
        ProviderType::Qwen => qwen_defaults(api_key?, model),
        ProviderType::Gemini => gemini_defaults(api_key?, model),
    };
    Some(config)
}
