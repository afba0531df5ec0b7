//! Paginated PDF generation for lists of content records.
//!
//! Records are laid out into atomic blocks, packed onto fixed-size pages,
//! rendered in chunks and merged into one document with continuous page
//! numbers. The building blocks live in the workspace crates and are
//! re-exported here:
//!
//! - [`layout`]: text measurement, block templates and page packing
//! - [`composer`]: merging documents and stamping page numbers
//! - [`preview`]: bounded page-image cache and the preview state machine
//!
//! This crate adds the chunk scheduler, request handling, the download
//! filename policy and the generation log.

pub mod error;
pub mod events;
pub mod export;
pub mod pipeline;

pub use error::PipelineError;
pub use events::{GenerationEvent, GenerationLog, JsonlFileLog, NoopLog};
pub use export::{content_disposition, export_filename, sanitize, GenerationJob, GenerationRequest};
pub use pipeline::{plan_chunks, ChunkScheduler, DocumentPipeline, PipelineBuilder, PipelineConfig};

pub use quire_layout as layout;
pub use quire_pdf_composer as composer;
pub use quire_preview as preview;
pub use quire_render_core as render;
pub use quire_render_lopdf as render_lopdf;
pub use quire_types as types;

pub use quire_pdf_composer::MergedDocument;
pub use quire_types::{CancellationToken, ContentRecord, HeaderInfo, ViewMode};
