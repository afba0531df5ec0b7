//! Synchronous text measurement against the faces the PDF writer embeds.

use crate::fonts::FontLibrary;
use crate::style::Font;

/// Measures strings with the advance widths of a [`FontLibrary`].
#[derive(Debug, Clone, Default)]
pub struct TextMetrics {
    fonts: FontLibrary,
}

impl TextMetrics {
    pub fn new(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Width of `text` in points at `size`.
    pub fn width(&self, text: &str, font: Font, size: f32) -> f32 {
        self.fonts.width(text, font, size)
    }

    pub fn char_width(&self, ch: char, font: Font, size: f32) -> f32 {
        let mut buf = [0u8; 4];
        self.width(ch.encode_utf8(&mut buf), font, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_width_is_the_sum_of_its_characters() {
        let metrics = TextMetrics::default();
        let whole = metrics.width("Hello", Font::Regular, 10.0);
        let parts: f32 = "Hello".chars().map(|c| metrics.char_width(c, Font::Regular, 10.0)).sum();
        assert!(whole > 0.0);
        assert!((whole - parts).abs() < 0.001);
    }

    #[test]
    fn narrow_and_wide_letters_differ() {
        let metrics = TextMetrics::default();
        assert!(metrics.char_width('i', Font::Regular, 12.0) < metrics.char_width('W', Font::Regular, 12.0));
        assert!(metrics.width("Hello", Font::Bold, 10.0) > metrics.width("Hello", Font::Regular, 10.0));
    }

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(TextMetrics::default().width("", Font::Regular, 12.0), 0.0);
    }
}
