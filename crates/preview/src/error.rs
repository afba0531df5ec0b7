use quire_render_core::RenderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Document has no pages")]
    NoPages,
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },
    #[error("Rasterization failed: {0}")]
    Raster(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Preview task failed: {0}")]
    Task(String),
    #[error("Render was superseded")]
    Cancelled,
}

impl From<lopdf::Error> for PreviewError {
    fn from(err: lopdf::Error) -> Self {
        PreviewError::Pdf(err.to_string())
    }
}

impl From<RenderError> for PreviewError {
    fn from(err: RenderError) -> Self {
        PreviewError::Render(err.to_string())
    }
}
