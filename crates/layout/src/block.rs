use crate::style::{BlockStyle, TextStyle};
use crate::text::{wrap_text, TextMetrics};

/// Vertical space between two paragraphs of the same block.
const PARAGRAPH_SPACING: f32 = 2.0;

/// Where a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Footer,
    /// A content record, by its index in the input list.
    Record(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    pub indent: f32,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self { text: text.into(), style, indent: 0.0 }
    }

    pub fn indented(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }
}

/// A block before measurement: styled paragraphs, not yet wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockContent {
    pub kind: BlockKind,
    pub style: BlockStyle,
    pub paragraphs: Vec<Paragraph>,
}

impl BlockContent {
    pub fn new(kind: BlockKind, style: BlockStyle) -> Self {
        Self { kind, style, paragraphs: Vec::new() }
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        if !paragraph.text.trim().is_empty() {
            self.paragraphs.push(paragraph);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Wraps every paragraph at `width` and computes the block's final height.
    pub fn measure(&self, width: f32, metrics: &TextMetrics) -> RenderableBlock {
        let inner_width = (width - 2.0 * self.style.padding).max(1.0);
        let mut lines = Vec::new();
        let mut cursor_y = self.style.padding;

        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                cursor_y += PARAGRAPH_SPACING;
            }
            let x = self.style.padding + paragraph.indent;
            let wrap_width = (inner_width - paragraph.indent).max(1.0);
            let style = paragraph.style;
            for text in wrap_text(&paragraph.text, metrics, style.font, style.size, wrap_width) {
                lines.push(Line { text, style, x, baseline: cursor_y + style.ascent() });
                cursor_y += style.line_height();
            }
        }

        RenderableBlock {
            kind: self.kind,
            style: self.style,
            width,
            height: cursor_y + self.style.padding,
            lines,
        }
    }
}

/// One wrapped line, positioned relative to its block's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub style: TextStyle,
    pub x: f32,
    pub baseline: f32,
}

/// A measured, atomic unit of page content. Never split across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableBlock {
    pub kind: BlockKind,
    pub style: BlockStyle,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<Line>,
}

impl RenderableBlock {
    /// An undecorated block of a given height with no text.
    pub fn fixed(kind: BlockKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            style: BlockStyle::default(),
            width,
            height,
            lines: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BODY, ROW_BOX, TERM};

    #[test]
    fn height_accounts_for_padding_lines_and_spacing() {
        let mut content = BlockContent::new(BlockKind::Record(0), ROW_BOX);
        content.push(Paragraph::new("apple", TERM));
        content.push(Paragraph::new("a round fruit", BODY));
        let block = content.measure(400.0, &TextMetrics::default());

        let expected = 2.0 * ROW_BOX.padding
            + TERM.line_height()
            + PARAGRAPH_SPACING
            + BODY.line_height();
        assert!((block.height - expected).abs() < 0.001);
        assert_eq!(block.lines.len(), 2);
        assert!(block.lines[1].baseline > block.lines[0].baseline);
    }

    #[test]
    fn narrow_width_wraps_into_more_lines() {
        let mut content = BlockContent::new(BlockKind::Record(0), ROW_BOX);
        content.push(Paragraph::new("one two three four five six seven eight", BODY));
        let wide = content.measure(500.0, &TextMetrics::default());
        let narrow = content.measure(60.0, &TextMetrics::default());
        assert!(narrow.lines.len() > wide.lines.len());
        assert!(narrow.height > wide.height);
    }

    #[test]
    fn blank_paragraphs_are_dropped() {
        let mut content = BlockContent::new(BlockKind::Footer, ROW_BOX);
        content.push(Paragraph::new("  ", BODY));
        assert!(content.is_empty());
    }
}
