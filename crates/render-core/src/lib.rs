//! Core rendering abstractions for PDF generation.
//!
//! This crate provides the seam between the chunk scheduler and a concrete
//! PDF backend:
//! - `ChunkRenderer` trait, rendering one chunk of records to a binary document
//! - `Chunk` and `RenderedDocument`, the unit of work and its result
//! - Error types for rendering operations

mod error;
mod traits;
mod types;

pub use error::RenderError;
pub use traits::ChunkRenderer;
pub use types::{Chunk, RenderOptions, RenderedDocument};
