use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Maximum number of page images kept across all documents.
    pub cache_capacity: usize,
    /// Quiet period after the last definition change before a render starts.
    pub debounce_ms: u64,
    pub default_scale: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { cache_capacity: 5, debounce_ms: 500, default_scale: 1.5 }
    }
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
