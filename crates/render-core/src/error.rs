use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Chunk {chunk} failed to render: {message}")]
    Chunk { chunk: usize, message: String },
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}
