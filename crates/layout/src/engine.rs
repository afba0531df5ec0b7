use crate::algorithms::pagination::{pack_heights, PackedPage};
use crate::block::RenderableBlock;
use crate::config::{PageGeometry, PagePolicy};
use crate::fonts::FontLibrary;
use crate::page::Page;
use crate::template::BlockTemplate;
use crate::text::TextMetrics;
use log::{debug, warn};
use quire_types::{ContentRecord, HeaderInfo};
use std::sync::Arc;

/// Measures blocks and packs them into fixed-size pages.
///
/// Layout runs strictly in order: measure header, footer and every block at
/// the final content width, pack, then stamp the page count. Nothing is
/// emitted before the total is known.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    policy: PagePolicy,
    metrics: TextMetrics,
}

impl LayoutEngine {
    pub fn new(geometry: PageGeometry, policy: PagePolicy) -> Self {
        Self { geometry, policy, metrics: TextMetrics::default() }
    }

    /// Measures with `fonts` instead of the bundled faces. The renderer must
    /// draw with the same library.
    pub fn with_fonts(mut self, fonts: FontLibrary) -> Self {
        self.metrics = TextMetrics::new(fonts);
        self
    }

    pub fn fonts(&self) -> &FontLibrary {
        self.metrics.fonts()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn policy(&self) -> &PagePolicy {
        &self.policy
    }

    /// Lays out `records` with `template`. `first_index` is the global index of
    /// the first record, used for numbering.
    pub fn layout_records(
        &self,
        records: &[ContentRecord],
        first_index: usize,
        header: &HeaderInfo,
        template: &BlockTemplate,
    ) -> Vec<Page> {
        let width = self.geometry.content_width();
        let header_block = BlockTemplate::header_block(header).map(|b| b.measure(width, &self.metrics));
        let footer_block = BlockTemplate::footer_block(header).map(|b| b.measure(width, &self.metrics));
        let blocks = records
            .iter()
            .enumerate()
            .map(|(i, record)| template.record_block(record, first_index + i).measure(width, &self.metrics))
            .collect();
        self.paginate(blocks, header_block, footer_block)
    }

    /// Packs already measured blocks into pages.
    pub fn paginate(
        &self,
        blocks: Vec<RenderableBlock>,
        header: Option<RenderableBlock>,
        footer: Option<RenderableBlock>,
    ) -> Vec<Page> {
        if blocks.is_empty() {
            return Vec::new();
        }

        let header_height = header.as_ref().map(|b| b.height);
        let footer_height = footer.as_ref().map(|b| b.height);
        let heights: Vec<f32> = blocks.iter().map(|b| b.height).collect();
        let packed = pack_heights(&heights, self.geometry.block_gap, |index, is_last| {
            self.available_height(header_height, footer_height, index, is_last)
        });

        let total = packed.len();
        debug!("Packed {} blocks into {} pages.", blocks.len(), total);

        let header = header.map(Arc::new);
        let footer = footer.map(Arc::new);
        let mut blocks = blocks.into_iter();
        packed
            .into_iter()
            .enumerate()
            .map(|(i, PackedPage { blocks: range, content_height, overflow })| {
                if overflow {
                    warn!(
                        "Page {} holds a single block of {:.1}pt that overflows the available height of {:.1}pt.",
                        i + 1,
                        content_height,
                        self.available_height(header_height, footer_height, i, i + 1 == total)
                    );
                }
                Page {
                    index: i + 1,
                    total,
                    header: header.clone().filter(|_| self.policy.header_on(i)),
                    footer: footer.clone().filter(|_| self.policy.footer_on(i + 1 == total)),
                    blocks: blocks.by_ref().take(range.len()).collect(),
                    content_height,
                    overflow,
                }
            })
            .collect()
    }

    /// Page height minus margins, the header and footer reservations that
    /// apply to this page, and the bottom safety margin.
    pub fn available_height(
        &self,
        header_height: Option<f32>,
        footer_height: Option<f32>,
        page_index: usize,
        is_last: bool,
    ) -> f32 {
        let g = &self.geometry;
        let mut available = g.content_height() - g.bottom_safety_margin;
        if let Some(h) = header_height.filter(|_| self.policy.header_on(page_index)) {
            available -= h + g.chrome_gap;
        }
        if let Some(h) = footer_height.filter(|_| self.policy.footer_on(is_last)) {
            available -= h + g.chrome_gap;
        }
        available.max(0.0)
    }
}
