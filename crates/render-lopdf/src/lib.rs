//! PDF renderer using lopdf.
//!
//! Each chunk of records is laid out with `quire-layout` and written as a
//! standalone, fully-formed PDF document in memory, with the faces it uses
//! embedded as Identity-H composite fonts.

mod fonts;
mod helpers;
mod renderer;

pub use fonts::{resource_name, text_string, FontUsage};
pub use helpers::render_page_content;
pub use renderer::LopdfRenderer;
