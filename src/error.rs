use crate::llm::ImageGenerationError;

/// Failure kinds surfaced to the user. Validation failures are
/// user-correctable and never change session state; remote failures keep
/// the prior result intact.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Image generation failed: {0}")]
    RemoteGeneration(String),
    #[error("{0}")]
    Unknown(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<ImageGenerationError> for AppError {
    fn from(err: ImageGenerationError) -> Self {
        AppError::RemoteGeneration(err.0)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Unknown(err.to_string())
    }
}
