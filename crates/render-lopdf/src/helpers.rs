//! Page content drawing. Converts a laid-out [`Page`] into a PDF content
//! stream in PDF user space (origin bottom-left).

use crate::fonts::{resource_name, FontUsage};
use lopdf::content::{Content, Operation};
use lopdf::Object;
use quire_layout::{FaceId, Font, FontLibrary, Page, PageGeometry, RenderableBlock};
use quire_types::Color;

const BORDER_WIDTH: f32 = 0.75;
const RULE_WIDTH: f32 = 0.5;

/// Builds the content stream for one page: header, record blocks, footer.
///
/// Text is resolved into glyph runs through `fonts`; the glyphs used are
/// recorded in `usage` for embedding once every page is written.
pub fn render_page_content(
    page: &Page,
    geometry: &PageGeometry,
    fonts: &FontLibrary,
    usage: &mut FontUsage,
) -> Content {
    let mut ctx = PageContext::new(geometry, fonts, usage);
    let mut cursor = geometry.margin_top;

    if let Some(header) = &page.header {
        ctx.draw_block(header, cursor);
        cursor += header.height + geometry.chrome_gap;
    }
    for (i, block) in page.blocks.iter().enumerate() {
        if i > 0 {
            cursor += geometry.block_gap;
        }
        ctx.draw_block(block, cursor);
        cursor += block.height;
    }
    if let Some(footer) = &page.footer {
        let top = geometry.size.height - geometry.margin_bottom - geometry.bottom_safety_margin - footer.height;
        ctx.draw_block(footer, top);
    }
    ctx.finish()
}

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font: Option<(FaceId, f32)>,
    fill_color: Option<Color>,
}

struct PageContext<'a> {
    geometry: &'a PageGeometry,
    fonts: &'a FontLibrary,
    usage: &'a mut FontUsage,
    content: Content,
    state: PageRenderState,
}

impl<'a> PageContext<'a> {
    fn new(geometry: &'a PageGeometry, fonts: &'a FontLibrary, usage: &'a mut FontUsage) -> Self {
        Self { geometry, fonts, usage, content: Content { operations: vec![] }, state: Default::default() }
    }

    fn finish(self) -> Content {
        self.content
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    /// Converts a top-down y coordinate to PDF user space.
    fn pdf_y(&self, y: f32) -> f32 {
        self.geometry.size.height - y
    }

    fn draw_block(&mut self, block: &RenderableBlock, top: f32) {
        let x = self.geometry.margin_left;
        self.draw_decoration(block, x, top);
        for line in &block.lines {
            self.draw_line(&line.text, line.style.font, line.style.size, line.style.color, x + line.x, top + line.baseline);
        }
    }

    fn draw_decoration(&mut self, block: &RenderableBlock, x: f32, top: f32) {
        let style = &block.style;
        let bottom = self.pdf_y(top + block.height);
        if let Some(bg) = style.background {
            self.set_fill_color(bg);
            self.push("re", vec![x.into(), bottom.into(), block.width.into(), block.height.into()]);
            self.push("f", vec![]);
        }
        if let Some(border) = style.border {
            self.push("w", vec![BORDER_WIDTH.into()]);
            self.push("RG", stroke_operands(border));
            self.push("re", vec![x.into(), bottom.into(), block.width.into(), block.height.into()]);
            self.push("S", vec![]);
        }
        if let Some(rule) = style.rule_below {
            self.push("w", vec![RULE_WIDTH.into()]);
            self.push("RG", stroke_operands(rule));
            self.push("m", vec![x.into(), bottom.into()]);
            self.push("l", vec![(x + block.width).into(), bottom.into()]);
            self.push("S", vec![]);
        }
    }

    fn draw_line(&mut self, text: &str, font: Font, size: f32, color: Color, x: f32, baseline: f32) {
        if text.trim().is_empty() {
            return;
        }
        let runs = self.fonts.runs(text, font, size);
        if runs.is_empty() {
            return;
        }
        self.push("BT", vec![]);
        self.set_fill_color(color);
        let y = self.pdf_y(baseline);
        self.push("Td", vec![x.into(), y.into()]);
        // Each Tj advances by the /W widths, so runs follow on without repositioning.
        for run in &runs {
            self.set_font(run.face, size);
            let operand = self.usage.encode_run(run);
            self.push("Tj", vec![operand]);
        }
        self.push("ET", vec![]);
    }

    /// `Tf` is part of the text state, which persists across BT/ET pairs.
    fn set_font(&mut self, face: FaceId, size: f32) {
        if self.state.font != Some((face, size)) {
            self.push("Tf", vec![Object::Name(resource_name(face)), size.into()]);
            self.state.font = Some((face, size));
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let [r, g, b] = color.to_unit();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(color);
        }
    }
}

fn stroke_operands(color: Color) -> Vec<Object> {
    let [r, g, b] = color.to_unit();
    vec![r.into(), g.into(), b.into()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_layout::style::BODY;
    use quire_layout::{BlockContent, BlockKind, BlockStyle, LayoutEngine, PagePolicy, Paragraph, TextMetrics};
    use std::sync::Arc;

    fn operators(content: &Content) -> Vec<&str> {
        content.operations.iter().map(|op| op.operator.as_str()).collect()
    }

    #[test]
    fn undecorated_blocks_draw_nothing() {
        let geometry = PageGeometry::default();
        let engine = LayoutEngine::new(geometry, PagePolicy::default());
        let blocks = vec![
            RenderableBlock::fixed(BlockKind::Record(0), geometry.content_width(), 100.0),
            RenderableBlock::fixed(BlockKind::Record(1), geometry.content_width(), 100.0),
        ];
        let pages = engine.paginate(blocks, None, None);
        let mut usage = FontUsage::new();
        let content = render_page_content(&pages[0], &geometry, engine.fonts(), &mut usage);
        assert!(content.operations.is_empty());
        assert!(usage.is_empty());
    }

    #[test]
    fn header_background_is_filled() {
        let geometry = PageGeometry::default();
        let mut header = RenderableBlock::fixed(BlockKind::Header, geometry.content_width(), 40.0);
        header.style.background = Some(Color::gray(230));
        let page = Page {
            index: 1,
            total: 1,
            header: Some(Arc::new(header)),
            footer: None,
            blocks: vec![],
            content_height: 0.0,
            overflow: false,
        };
        let mut usage = FontUsage::new();
        let ops = operators(&render_page_content(&page, &geometry, &FontLibrary::builtin(), &mut usage)).join(" ");
        assert_eq!(ops, "rg re f");
    }

    #[test]
    fn lines_are_drawn_as_glyph_runs() {
        let geometry = PageGeometry::default();
        let mut block = BlockContent::new(BlockKind::Record(0), BlockStyle::default());
        block.push(Paragraph::new("Привет world", BODY));
        let fonts = FontLibrary::builtin();
        let block = block.measure(geometry.content_width(), &TextMetrics::new(fonts.clone()));
        let page = Page {
            index: 1,
            total: 1,
            header: None,
            footer: None,
            blocks: vec![block],
            content_height: 0.0,
            overflow: false,
        };

        let mut usage = FontUsage::new();
        let content = render_page_content(&page, &geometry, &fonts, &mut usage);
        assert_eq!(operators(&content).join(" "), "BT rg Td Tf Tj ET");
        let tj = content.operations.iter().find(|op| op.operator == "Tj").unwrap();
        let Object::String(bytes, _) = &tj.operands[0] else { panic!("Tj without a string") };
        assert_eq!(bytes.len(), 2 * "Привет world".chars().count());
        assert!(!usage.is_empty());
    }
}
