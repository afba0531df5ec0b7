//! On-screen preview support.
//!
//! A finished PDF binary is rasterized into one PNG per page. Page images are
//! kept in a small FIFO cache shared by every open preview and keyed by
//! document, page and scale. [`PreviewController`] wraps rendering in a
//! debounced, cancellable state machine observable through a
//! `tokio::sync::watch` channel.

mod cache;
mod config;
mod controller;
mod error;
mod navigator;
mod raster;
mod render;

pub use cache::{CacheKey, PageImage, PreviewCache, SharedPreviewCache};
pub use config::PreviewConfig;
pub use controller::{PreviewController, PreviewDefinition, PreviewPages, RenderState};
pub use error::PreviewError;
pub use navigator::{clamp_page, PageNavigator};
pub use raster::{LopdfRasterizer, PageRasterizer};
pub use render::{render_page_image, render_to_images, render_to_images_until};
