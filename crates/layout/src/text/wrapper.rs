use super::metrics::TextMetrics;
use crate::style::Font;

/// Breaks `text` into lines no wider than `max_width`.
///
/// Breaks at whitespace; explicit newlines always break. A word wider than
/// the line on its own is split between characters.
pub fn wrap_text(
    text: &str,
    metrics: &TextMetrics,
    font: Font,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let space = metrics.width(" ", font, size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = metrics.width(word, font, size);

            if !current.is_empty() && current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                for ch in word.chars() {
                    let ch_width = metrics.char_width(ch, font, size);
                    if !current.is_empty() && current_width + ch_width > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, max_width: f32) -> Vec<String> {
        wrap_text(text, &TextMetrics::default(), Font::Regular, 10.0, max_width)
    }

    fn width(text: &str) -> f32 {
        TextMetrics::default().width(text, Font::Regular, 10.0)
    }

    #[test]
    fn keeps_short_text_on_one_line() {
        assert_eq!(wrap("a short line", 500.0), vec!["a short line"]);
    }

    #[test]
    fn breaks_at_word_boundaries() {
        let two_words = width("aaaaa bbbbb");
        assert!(two_words < width("aaaaa bbbbb ccccc"));
        let lines = wrap("aaaaa bbbbb ccccc", two_words + 1.0);
        assert_eq!(lines, vec!["aaaaa bbbbb", "ccccc"]);
    }

    #[test]
    fn splits_words_wider_than_the_line() {
        let lines = wrap("abcdefghij", width("abcd"));
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "abcdefghij");
    }

    #[test]
    fn honours_explicit_newlines_and_skips_blank_input() {
        assert_eq!(wrap("one\ntwo", 500.0), vec!["one", "two"]);
        assert!(wrap("   ", 500.0).is_empty());
    }
}
