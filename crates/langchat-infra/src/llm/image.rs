//! OpenAiImageProvider -- [`ImageProvider`] for OpenAI-style image APIs.
//!
//! Posts to `{base_url}/images/generations` and returns the image URLs.
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed when
//! building the authorization header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use langchat_core::llm::image::ImageProvider;
use langchat_types::image::{GeneratedImage, ImageRequest};
use langchat_types::llm::LlmError;

#[derive(Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Image provider for any vendor exposing `/images/generations`.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    provider_name: String,
}

impl OpenAiImageProvider {
    pub fn new(
        provider_name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider_name: provider_name.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }
}

impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, LlmError> {
        let body = ImageGenerationBody {
            model: &request.model,
            prompt: &request.prompt,
            n: request.n.max(1),
            size: request.size.as_deref(),
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited {
                    retry_after_ms: None,
                },
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(parsed
            .data
            .into_iter()
            .map(|d| GeneratedImage {
                url: d.url,
                revised_prompt: d.revised_prompt,
            })
            .collect())
    }
}
