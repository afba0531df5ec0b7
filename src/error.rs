use quire_pdf_composer::ComposerError;
use quire_render_core::RenderError;
use quire_types::RecordError;
use thiserror::Error;

/// A comprehensive error type for the document generation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InputValidation(#[from] RecordError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Merging failed: {0}")]
    Merge(#[from] ComposerError),

    #[error("Generation was cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        PipelineError::Task(e.to_string())
    }
}
