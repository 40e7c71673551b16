//! ImageProvider trait and its type-erased wrapper.
//!
//! Same blanket-impl pattern as [`super::box_provider::BoxLlmProvider`].

use std::future::Future;
use std::pin::Pin;

use langchat_types::image::{GeneratedImage, ImageRequest};
use langchat_types::llm::LlmError;

/// Trait for image generation backends.
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate images for a fully rendered prompt.
    fn generate(
        &self,
        request: &ImageRequest,
    ) -> impl Future<Output = Result<Vec<GeneratedImage>, LlmError>> + Send;
}

/// Object-safe version of [`ImageProvider`].
pub trait ImageProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GeneratedImage>, LlmError>> + Send + 'a>>;
}

impl<T: ImageProvider> ImageProviderDyn for T {
    fn name(&self) -> &str {
        ImageProvider::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GeneratedImage>, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased image provider.
pub struct BoxImageProvider {
    inner: Box<dyn ImageProviderDyn + Send + Sync>,
}

impl BoxImageProvider {
    pub fn new<T: ImageProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, LlmError> {
        self.inner.generate_boxed(request).await
    }
}
