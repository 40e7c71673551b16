//! Model registry entries.
//!
//! Each row describes one vendor model the service can call, including the
//! credentials needed to reach it. Credentials must be stripped with
//! [`ModelConfig::redacted`] before a model is returned to a client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::llm::ProviderType;

/// What a model is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Chat,
    Image,
    Embedding,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Chat => write!(f, "chat"),
            ModelKind::Image => write!(f, "image"),
            ModelKind::Embedding => write!(f, "embedding"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(ModelKind::Chat),
            "image" => Ok(ModelKind::Image),
            "embedding" => Ok(ModelKind::Embedding),
            other => Err(format!("invalid model kind: '{other}'")),
        }
    }
}

/// A configured vendor model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    /// Display name.
    pub name: String,
    pub kind: ModelKind,
    pub provider: ProviderType,
    /// Vendor model identifier (e.g. "gpt-4o", "dall-e-3").
    pub model: String,
    /// Override for the vendor's default endpoint.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Image dimensions such as "1024x1024" (image models only).
    pub image_size: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ModelConfig {
    /// Copy with every credential field cleared.
    pub fn redacted(mut self) -> Self {
        self.api_key = None;
        self.secret_key = None;
        self
    }
}
