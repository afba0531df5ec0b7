//! Measurement-based pagination.
//!
//! Records are turned into blocks by a [`BlockTemplate`], measured
//! synchronously against the faces of a [`FontLibrary`], and packed greedily
//! into fixed-size pages. Blocks are atomic: a block is never split across
//! pages, and a page always receives at least one block.

pub mod algorithms;
pub mod block;
pub mod config;
pub mod engine;
pub mod fonts;
pub mod page;
pub mod style;
pub mod template;
pub mod text;

pub use self::algorithms::pagination::{pack_heights, PackedPage};
pub use self::block::{BlockContent, BlockKind, Line, Paragraph, RenderableBlock};
pub use self::config::{FooterRepeat, HeaderRepeat, PageGeometry, PagePolicy};
pub use self::engine::LayoutEngine;
pub use self::fonts::{FaceId, FontError, FontFace, FontLibrary, Glyph, GlyphRun};
pub use self::page::Page;
pub use self::style::{BlockStyle, Font, TextStyle};
pub use self::template::BlockTemplate;
pub use self::text::TextMetrics;

// Re-export geometry types so downstream crates see a single definition
pub use quire_types::geometry::Size;
