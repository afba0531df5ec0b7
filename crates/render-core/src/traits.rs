use crate::error::RenderError;
use crate::types::{Chunk, RenderOptions, RenderedDocument};

/// Renders one chunk of records into a standalone binary document.
///
/// Implementations are synchronous and CPU-bound; async callers move them onto
/// a blocking thread. A renderer must be shareable so the scheduler can hand
/// the same instance to every chunk.
pub trait ChunkRenderer: Send + Sync {
    fn render(&self, chunk: &Chunk, options: &RenderOptions) -> Result<RenderedDocument, RenderError>;
}

impl<R: ChunkRenderer + ?Sized> ChunkRenderer for std::sync::Arc<R> {
    fn render(&self, chunk: &Chunk, options: &RenderOptions) -> Result<RenderedDocument, RenderError> {
        (**self).render(chunk, options)
    }
}
