use crate::config::Config;
use quire::{DocumentPipeline, PipelineBuilder, PipelineError};
use std::sync::Arc;

/// Shared application state accessible to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, PipelineError> {
        let mut builder = PipelineBuilder::new().with_config(config.pipeline);
        if let Some(path) = &config.generation_log.path {
            builder = builder.with_log_file(path.clone());
        }
        Ok(Self::with_pipeline(builder.build()?, config))
    }

    pub fn with_pipeline(pipeline: DocumentPipeline, config: Config) -> Self {
        Self { pipeline: Arc::new(pipeline), config: Arc::new(config) }
    }
}
