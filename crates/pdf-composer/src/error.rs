use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to merge: no input documents")]
    Empty,

    #[error("{0}")]
    Other(String),
}
