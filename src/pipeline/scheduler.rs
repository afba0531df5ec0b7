use super::chunking::plan_chunks;
use super::config::PipelineConfig;
use crate::error::PipelineError;
use crate::export::GenerationJob;
use quire_layout::{HeaderRepeat, LayoutEngine};
use quire_pdf_composer::{DocumentMerger, MergedDocument, PageNumberStyle};
use quire_render_core::{Chunk, ChunkRenderer, RenderOptions, RenderedDocument};
use quire_render_lopdf::LopdfRenderer;
use quire_types::CancellationToken;
use std::sync::Arc;
use std::time::Instant;

/// Turns a job into a single PDF, splitting large jobs into chunks.
///
/// Chunks are rendered strictly one after another on the blocking pool and
/// folded into the accumulated document as soon as each completes, so at
/// most one intermediate document is alive at a time. Page numbers are
/// stamped once the final page count is known.
#[derive(Clone)]
pub struct ChunkScheduler {
    renderer: Arc<dyn ChunkRenderer>,
    config: PipelineConfig,
    number_style: PageNumberStyle,
}

impl ChunkScheduler {
    /// A scheduler rendering through [`LopdfRenderer`] with the configured
    /// geometry and page policy.
    pub fn new(config: PipelineConfig) -> Self {
        let engine = LayoutEngine::new(config.geometry, config.policy).with_fonts(config.font_library());
        Self::with_renderer(Arc::new(LopdfRenderer::new(engine)), config)
    }

    pub fn with_renderer(renderer: Arc<dyn ChunkRenderer>, config: PipelineConfig) -> Self {
        Self { renderer, config, number_style: PageNumberStyle::default() }
    }

    /// Style of the labels stamped after a multi-chunk merge.
    pub fn with_number_style(mut self, number_style: PageNumberStyle) -> Self {
        self.number_style = number_style;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generates the document for `job`.
    ///
    /// Returns `Ok(None)` when the job has no records. Any chunk failure
    /// aborts the whole generation without partial output.
    pub async fn generate(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<Option<MergedDocument>, PipelineError> {
        let total = job.records.len();
        if total == 0 {
            log::info!("[SCHEDULER] No records, nothing to generate.");
            return Ok(None);
        }
        let started = Instant::now();
        let options = RenderOptions { view_mode: job.view_mode, ..RenderOptions::default() };

        if total <= self.config.chunk_size.max(1) {
            let chunk = Chunk::whole(job.records.clone(), job.header.clone());
            let rendered = self
                .render_chunk(chunk, RenderOptions { page_numbers: true, ..options }, cancel)
                .await?;
            log::info!(
                "[SCHEDULER] Rendered {} records into {} pages in {:.2?}.",
                total,
                rendered.page_count(),
                started.elapsed()
            );
            let page_count = rendered.page_count();
            return Ok(Some(MergedDocument::new(rendered.into_bytes(), page_count)));
        }

        let mut chunks = plan_chunks(job.records.clone(), &job.header, self.config.chunk_size);
        if self.config.policy.header == HeaderRepeat::EveryPage {
            for chunk in &mut chunks {
                chunk.header = job.header.clone();
            }
        }
        let chunk_count = chunks.len();
        log::info!(
            "[SCHEDULER] Splitting {} records into {} chunks of up to {}.",
            total,
            chunk_count,
            self.config.chunk_size
        );

        let mut merger = DocumentMerger::new();
        for chunk in chunks {
            let index = chunk.index;
            let continued = index + 1 < chunk_count;
            let rendered = self.render_chunk(chunk, RenderOptions { continued, ..options }, cancel).await?;
            merger = tokio::task::spawn_blocking(move || {
                merger.append(rendered.bytes())?;
                Ok::<_, PipelineError>(merger)
            })
            .await??;
            log::debug!(
                "[SCHEDULER] Chunk {}/{} merged ({} pages so far).",
                index + 1,
                chunk_count,
                merger.page_count()
            );

            if continued {
                tokio::time::sleep(self.config.inter_chunk_delay()).await;
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
            }
        }

        let style = self.number_style;
        let merged = tokio::task::spawn_blocking(move || merger.finish(Some(&style))).await??;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        log::info!(
            "[SCHEDULER] Merged {} chunks into {} pages in {:.2?}.",
            chunk_count,
            merged.page_count(),
            started.elapsed()
        );
        Ok(Some(merged))
    }

    async fn render_chunk(
        &self,
        chunk: Chunk,
        options: RenderOptions,
        cancel: &CancellationToken,
    ) -> Result<RenderedDocument, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&chunk, &options)).await??;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(rendered)
    }
}
