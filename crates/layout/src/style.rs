use quire_types::Color;

/// The two weights every template draws with. Each maps to a fallback
/// chain of faces in a [`FontLibrary`](crate::FontLibrary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Font {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
    /// Line height as a multiple of `size`.
    pub leading: f32,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, color: Color) -> Self {
        Self { font, size, color, leading: 1.3 }
    }

    pub fn line_height(&self) -> f32 {
        self.size * self.leading
    }

    /// Distance from the top of a line box to the text baseline.
    pub fn ascent(&self) -> f32 {
        self.size * 0.8 + (self.line_height() - self.size) / 2.0
    }
}

/// Box decoration around a block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockStyle {
    pub padding: f32,
    pub background: Option<Color>,
    pub border: Option<Color>,
    /// A hairline drawn under the block.
    pub rule_below: Option<Color>,
}

const INK: Color = Color::rgb(0x1f, 0x23, 0x28);
const MUTED: Color = Color::rgb(0x5f, 0x66, 0x6d);
const ACCENT: Color = Color::rgb(0x1d, 0x4e, 0x89);
const HAIRLINE: Color = Color::rgb(0xd0, 0xd5, 0xdb);
const CARD: Color = Color::rgb(0xf4, 0xf6, 0xf8);
const BANNER: Color = Color::rgb(0xe8, 0xef, 0xf7);

pub const TITLE: TextStyle = TextStyle::new(Font::Bold, 20.0, ACCENT);
pub const DESCRIPTION: TextStyle = TextStyle::new(Font::Regular, 11.0, MUTED);
pub const FOOTER: TextStyle = TextStyle::new(Font::Regular, 9.0, MUTED);
pub const TERM: TextStyle = TextStyle::new(Font::Bold, 12.0, INK);
pub const CARD_TERM: TextStyle = TextStyle::new(Font::Bold, 16.0, ACCENT);
pub const BODY: TextStyle = TextStyle::new(Font::Regular, 11.0, INK);
pub const NOTE: TextStyle = TextStyle::new(Font::Regular, 10.0, MUTED);

pub const BANNER_BOX: BlockStyle = BlockStyle {
    padding: 12.0,
    background: Some(BANNER),
    border: None,
    rule_below: None,
};

pub const FOOTER_BOX: BlockStyle = BlockStyle {
    padding: 0.0,
    background: None,
    border: None,
    rule_below: None,
};

pub const ROW_BOX: BlockStyle = BlockStyle {
    padding: 4.0,
    background: None,
    border: None,
    rule_below: Some(HAIRLINE),
};

pub const CARD_BOX: BlockStyle = BlockStyle {
    padding: 10.0,
    background: Some(CARD),
    border: Some(HAIRLINE),
    rule_below: None,
};

pub const QUESTION_BOX: BlockStyle = BlockStyle {
    padding: 4.0,
    background: None,
    border: None,
    rule_below: None,
};
