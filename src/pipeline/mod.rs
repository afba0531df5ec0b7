//! Chunked document generation.
//!
//! - [`plan_chunks`]: splits records into contiguous chunks
//! - [`ChunkScheduler`]: renders chunks sequentially and merges them
//! - [`PipelineBuilder`] / [`DocumentPipeline`]: the export entry point
//!
//! # Example
//!
//! ```ignore
//! use quire::{GenerationRequest, PipelineBuilder};
//!
//! let pipeline = PipelineBuilder::new().with_chunk_size(500).build()?;
//! let job = request.into_job()?;
//! pipeline.generate_to_file(&job, job.filename())?;
//! ```

mod builder;
mod chunking;
pub mod config;
mod orchestrator;
mod scheduler;

pub use builder::PipelineBuilder;
pub use chunking::plan_chunks;
pub use config::PipelineConfig;
pub use orchestrator::DocumentPipeline;
pub use scheduler::ChunkScheduler;
