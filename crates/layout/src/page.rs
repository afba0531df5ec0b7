use crate::block::RenderableBlock;
use std::sync::Arc;

/// One packed page, ready to render.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page index.
    pub index: usize,
    /// Number of pages in the layout. Only known once packing has finished.
    pub total: usize,
    pub header: Option<Arc<RenderableBlock>>,
    pub footer: Option<Arc<RenderableBlock>>,
    pub blocks: Vec<RenderableBlock>,
    /// Σ block heights + gap × (count − 1).
    pub content_height: f32,
    /// The page's only block is taller than the available height and runs
    /// past the bottom margin.
    pub overflow: bool,
}

impl Page {
    /// The "index / total" annotation drawn bottom-right.
    pub fn number_label(&self) -> String {
        format!("{} / {}", self.index, self.total)
    }

    pub fn is_first(&self) -> bool {
        self.index == 1
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }
}
