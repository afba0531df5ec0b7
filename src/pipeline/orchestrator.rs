use super::scheduler::ChunkScheduler;
use crate::error::PipelineError;
use crate::events::{GenerationEvent, GenerationLog};
use crate::export::GenerationJob;
use quire_pdf_composer::MergedDocument;
use quire_types::CancellationToken;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Builder;
use tokio::task::JoinHandle;

/// The export entry point: generates a job and reports it to the log.
#[derive(Clone)]
pub struct DocumentPipeline {
    scheduler: ChunkScheduler,
    generation_log: Arc<dyn GenerationLog>,
}

impl DocumentPipeline {
    pub(super) fn new(scheduler: ChunkScheduler, generation_log: Arc<dyn GenerationLog>) -> Self {
        Self { scheduler, generation_log }
    }

    pub fn scheduler(&self) -> &ChunkScheduler {
        &self.scheduler
    }

    /// Generates `job` and, on success, hands a [`GenerationEvent`] to the
    /// generation log on a detached blocking task. The log result never
    /// changes the outcome of this call.
    pub async fn generate(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<Option<MergedDocument>, PipelineError> {
        let (merged, _detached) = self.generate_and_log(job, cancel).await?;
        Ok(merged)
    }

    async fn generate_and_log(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<(Option<MergedDocument>, Option<JoinHandle<()>>), PipelineError> {
        let started = Instant::now();
        let merged = self.scheduler.generate(job, cancel).await?;
        let logged = merged.as_ref().map(|doc| {
            let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.dispatch_event(GenerationEvent::new(job, doc.page_count(), elapsed))
        });
        Ok((merged, logged))
    }

    fn dispatch_event(&self, event: GenerationEvent) -> JoinHandle<()> {
        let sink = Arc::clone(&self.generation_log);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = sink.record(&event) {
                log::warn!("[PIPELINE] Failed to record generation of '{}': {}", event.filename, e);
            }
        })
    }

    /// A convenience method that runs the async pipeline on its own runtime
    /// and writes the result to `path`. Returns the page count, or `None`
    /// (writing nothing) when the job has no records.
    pub fn generate_to_file<P: AsRef<Path>>(
        &self,
        job: &GenerationJob,
        path: P,
    ) -> Result<Option<usize>, PipelineError> {
        let rt = Builder::new_multi_thread().enable_all().build()?;
        let merged = rt.block_on(async {
            let (merged, logged) = self.generate_and_log(job, &CancellationToken::new()).await?;
            // A CLI run exits right after this, so wait for the log write.
            if let Some(handle) = logged {
                handle.await?;
            }
            Ok::<_, PipelineError>(merged)
        })?;
        let Some(merged) = merged else {
            return Ok(None);
        };

        let output_path = path.as_ref();
        if let Some(parent_dir) = output_path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(output_path, merged.bytes())?;
        Ok(Some(merged.page_count()))
    }
}
