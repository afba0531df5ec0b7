use super::config::PipelineConfig;
use super::orchestrator::DocumentPipeline;
use super::scheduler::ChunkScheduler;
use crate::error::PipelineError;
use crate::events::{GenerationLog, JsonlFileLog, NoopLog};
use quire_layout::{FontLibrary, LayoutEngine, PageGeometry, PagePolicy};
use quire_pdf_composer::PageNumberStyle;
use quire_render_core::ChunkRenderer;
use quire_render_lopdf::LopdfRenderer;
use std::path::PathBuf;
use std::sync::Arc;

/// A builder for creating a `DocumentPipeline`.
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    renderer: Option<Arc<dyn ChunkRenderer>>,
    fonts: Option<FontLibrary>,
    number_style: PageNumberStyle,
    generation_log: Option<Arc<dyn GenerationLog>>,
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum number of records per chunk.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn with_inter_chunk_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.inter_chunk_delay_ms = delay_ms;
        self
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn with_policy(mut self, policy: PagePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Looks up installed fonts for characters the bundled faces lack.
    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.config.system_fonts = enabled;
        self
    }

    /// Faces for the default renderer. Takes precedence over `with_system_fonts`.
    pub fn with_fonts(mut self, fonts: FontLibrary) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Replaces the default lopdf renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn ChunkRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Style of the "k / T" labels, for single-pass and merged output alike.
    /// A custom renderer keeps its own style for single-chunk jobs.
    pub fn with_number_style(mut self, style: PageNumberStyle) -> Self {
        self.number_style = style;
        self
    }

    pub fn with_generation_log(mut self, log: Arc<dyn GenerationLog>) -> Self {
        self.generation_log = Some(log);
        self
    }

    /// Appends generation events as JSON lines to `path`.
    pub fn with_log_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_generation_log(Arc::new(JsonlFileLog::new(path)))
    }

    pub fn build(self) -> Result<DocumentPipeline, PipelineError> {
        if self.config.chunk_size == 0 {
            return Err(PipelineError::Config("chunk_size must be at least 1".into()));
        }
        let config = self.config;
        let fonts = self.fonts;
        let renderer = self.renderer.unwrap_or_else(|| {
            let fonts = fonts.unwrap_or_else(|| config.font_library());
            let engine = LayoutEngine::new(config.geometry, config.policy).with_fonts(fonts);
            Arc::new(LopdfRenderer::new(engine).with_number_style(self.number_style))
        });
        let scheduler =
            ChunkScheduler::with_renderer(renderer, self.config).with_number_style(self.number_style);
        let generation_log = self.generation_log.unwrap_or_else(|| Arc::new(NoopLog));

        log::debug!(
            "[PIPELINE] Built pipeline: chunk_size={}, inter_chunk_delay={}ms.",
            self.config.chunk_size,
            self.config.inter_chunk_delay_ms
        );
        Ok(DocumentPipeline::new(scheduler, generation_log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = PipelineBuilder::new().with_chunk_size(0).build().err().unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn fluent_settings_reach_the_scheduler() {
        let pipeline = PipelineBuilder::new()
            .with_chunk_size(25)
            .with_inter_chunk_delay_ms(0)
            .build()
            .unwrap();
        assert_eq!(pipeline.scheduler().config().chunk_size, 25);
        assert_eq!(pipeline.scheduler().config().inter_chunk_delay_ms, 0);
    }

    #[test]
    fn system_fonts_are_off_unless_requested() {
        assert!(!PipelineBuilder::new().build().unwrap().scheduler().config().system_fonts);
        let pipeline = PipelineBuilder::new().with_system_fonts(true).build().unwrap();
        assert!(pipeline.scheduler().config().system_fonts);
    }
}
