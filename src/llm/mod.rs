pub mod gemini;

use async_trait::async_trait;

use crate::media::ImageKind;

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
#[error("Image generation failed: {0}")]
pub struct ImageGenerationError(pub String);

/// One source image plus the instruction derived for it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image_data: String,
    pub content_type: ImageKind,
    pub instruction: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Capability boundary to the generative service. One operation, one
/// failure kind, no retry; a deterministic fake stands in for it in tests.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedImage, ImageGenerationError>;
}
