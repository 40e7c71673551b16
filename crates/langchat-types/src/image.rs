//! Image generation request/response types.

use serde::{Deserialize, Serialize};

/// Request to an image generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    /// Fully rendered prompt.
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default = "default_count")]
    pub n: u8,
}

fn default_count() -> u8 {
    1
}

/// One generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_default_count() {
        let req: ImageRequest =
            serde_json::from_str(r#"{"model":"dall-e-3","prompt":"a cat"}"#).unwrap();
        assert_eq!(req.n, 1);
        assert!(req.size.is_none());
    }
}
