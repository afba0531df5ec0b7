use quire_layout::{FontLibrary, PageGeometry, PagePolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for chunked generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of records rendered as one standalone document.
    pub chunk_size: usize,
    /// Pause between consecutive chunks, giving other work on the runtime a
    /// chance to run.
    pub inter_chunk_delay_ms: u64,
    pub geometry: PageGeometry,
    pub policy: PagePolicy,
    /// Extend the bundled faces with installed fonts for scripts they lack.
    pub system_fonts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            inter_chunk_delay_ms: 500,
            geometry: PageGeometry::default(),
            policy: PagePolicy::default(),
            system_fonts: false,
        }
    }
}

impl PipelineConfig {
    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.inter_chunk_delay_ms)
    }

    /// The faces text is measured and drawn with.
    pub fn font_library(&self) -> FontLibrary {
        if self.system_fonts {
            FontLibrary::builtin().with_system_fallbacks()
        } else {
            FontLibrary::builtin()
        }
    }
}
