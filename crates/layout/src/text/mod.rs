pub mod metrics;
pub mod wrapper;

pub use metrics::TextMetrics;
pub use wrapper::wrap_text;
