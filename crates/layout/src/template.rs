//! Block templates: how a record, the header banner, and the footer turn
//! into unmeasured [`BlockContent`] for each view mode.

use crate::block::{BlockContent, BlockKind, Paragraph};
use crate::style::{
    BANNER_BOX, BODY, CARD_BOX, CARD_TERM, DESCRIPTION, FOOTER, FOOTER_BOX, NOTE, QUESTION_BOX,
    ROW_BOX, TERM, TITLE,
};
use quire_types::{seeded_shuffle, ContentRecord, HeaderInfo, ViewMode};

const TERM_KEYS: &[&str] = &["word", "term", "front"];
const MEANING_KEYS: &[&str] = &["meaning", "definition", "back"];
const EXAMPLE_KEYS: &[&str] = &["example", "sentence"];
const PART_OF_SPEECH_KEYS: &[&str] = &["partOfSpeech", "pos"];
const QUESTION_KEYS: &[&str] = &["question", "prompt"];
const ANSWER_KEYS: &[&str] = &["answer", "correctAnswer"];
const DISTRACTOR_KEYS: &[&str] = &["distractors", "wrongAnswers"];
const OPTION_KEYS: &[&str] = &["options", "choices"];
const ID_KEYS: &[&str] = &["id"];

const INDENT: f32 = 16.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTemplate {
    view_mode: ViewMode,
}

impl BlockTemplate {
    pub fn new(view_mode: ViewMode) -> Self {
        Self { view_mode }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Builds the block for `record`. `index` is the record's position in the
    /// full input list, so numbering stays continuous across chunks.
    pub fn record_block(&self, record: &ContentRecord, index: usize) -> BlockContent {
        match self.view_mode {
            ViewMode::WordList => word_row(record, index),
            ViewMode::Flashcards => flashcard(record, index),
            ViewMode::Quiz => question(record, index),
        }
    }

    /// The title banner, or `None` when there is neither title nor description.
    pub fn header_block(header: &HeaderInfo) -> Option<BlockContent> {
        if header.banner_is_empty() {
            return None;
        }
        let mut block = BlockContent::new(BlockKind::Header, BANNER_BOX);
        block.push(Paragraph::new(header.title.trim(), TITLE));
        block.push(Paragraph::new(header.description.trim(), DESCRIPTION));
        Some(block)
    }

    pub fn footer_block(header: &HeaderInfo) -> Option<BlockContent> {
        if header.footer_is_empty() {
            return None;
        }
        let mut block = BlockContent::new(BlockKind::Footer, FOOTER_BOX);
        block.push(Paragraph::new(header.footer_left.trim(), FOOTER));
        Some(block)
    }
}

fn word_row(record: &ContentRecord, index: usize) -> BlockContent {
    let mut block = BlockContent::new(BlockKind::Record(index), ROW_BOX);
    let term = record.text(TERM_KEYS).unwrap_or_default();
    let heading = match record.text(PART_OF_SPEECH_KEYS) {
        Some(pos) => format!("{}. {} ({})", index + 1, term, pos),
        None => format!("{}. {}", index + 1, term),
    };
    block.push(Paragraph::new(heading, TERM));
    if let Some(meaning) = record.text(MEANING_KEYS) {
        block.push(Paragraph::new(meaning, BODY).indented(INDENT));
    }
    if let Some(example) = record.text(EXAMPLE_KEYS) {
        block.push(Paragraph::new(format!("e.g. {}", example), NOTE).indented(INDENT));
    }
    block
}

fn flashcard(record: &ContentRecord, index: usize) -> BlockContent {
    let mut block = BlockContent::new(BlockKind::Record(index), CARD_BOX);
    let term = record.text(TERM_KEYS).unwrap_or_default();
    block.push(Paragraph::new(format!("{}. {}", index + 1, term), CARD_TERM));
    if let Some(meaning) = record.text(MEANING_KEYS) {
        block.push(Paragraph::new(meaning, BODY));
    }
    if let Some(example) = record.text(EXAMPLE_KEYS) {
        block.push(Paragraph::new(example, NOTE));
    }
    block
}

fn question(record: &ContentRecord, index: usize) -> BlockContent {
    let mut block = BlockContent::new(BlockKind::Record(index), QUESTION_BOX);
    let prompt = record.text(QUESTION_KEYS).unwrap_or_default();
    block.push(Paragraph::new(format!("{}. {}", index + 1, prompt), TERM));

    for (label, choice) in ('A'..='Z').zip(choices(record, index)) {
        block.push(Paragraph::new(format!("{}) {}", label, choice), BODY).indented(INDENT));
    }
    block
}

/// Explicit options are kept in their given order. Otherwise the answer and
/// its distractors are shuffled with a seed derived from the record, so the
/// same question always lists its choices in the same order.
fn choices(record: &ContentRecord, index: usize) -> Vec<String> {
    let options = record.list(OPTION_KEYS);
    if !options.is_empty() {
        return options;
    }

    let mut choices = record.list(DISTRACTOR_KEYS);
    if let Some(answer) = record.text(ANSWER_KEYS) {
        choices.push(answer.into_owned());
    }
    let seed = record
        .text(ID_KEYS)
        .or_else(|| record.text(QUESTION_KEYS))
        .map(|s| s.into_owned())
        .unwrap_or_else(|| index.to_string());
    seeded_shuffle(&mut choices, &seed);
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ContentRecord {
        ContentRecord::new(value, 0).unwrap()
    }

    #[test]
    fn word_row_numbers_from_global_index() {
        let template = BlockTemplate::new(ViewMode::WordList);
        let block = template.record_block(&record(json!({ "word": "apple", "meaning": "a fruit" })), 41);
        assert_eq!(block.kind, BlockKind::Record(41));
        assert_eq!(block.paragraphs[0].text, "42. apple");
        assert_eq!(block.paragraphs[1].text, "a fruit");
    }

    #[test]
    fn quiz_choices_are_stable_and_complete() {
        let template = BlockTemplate::new(ViewMode::Quiz);
        let q = record(json!({
            "id": "q-17",
            "question": "Pick the fruit",
            "answer": "apple",
            "distractors": ["chair", "cloud", "river"]
        }));
        let first = template.record_block(&q, 0);
        let second = template.record_block(&q, 0);
        assert_eq!(first, second);

        let mut listed: Vec<_> = first.paragraphs[1..]
            .iter()
            .map(|p| p.text[3..].to_string())
            .collect();
        listed.sort();
        assert_eq!(listed, ["apple", "chair", "cloud", "river"]);
        assert!(first.paragraphs[1].text.starts_with("A) "));
    }

    #[test]
    fn explicit_options_keep_their_order() {
        let template = BlockTemplate::new(ViewMode::Quiz);
        let q = record(json!({ "question": "2 + 2", "options": ["3", "4", "5"] }));
        let block = template.record_block(&q, 0);
        let texts: Vec<_> = block.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["1. 2 + 2", "A) 3", "B) 4", "C) 5"]);
    }

    #[test]
    fn header_and_footer_blocks_are_optional() {
        assert!(BlockTemplate::header_block(&HeaderInfo::default()).is_none());
        assert!(BlockTemplate::footer_block(&HeaderInfo::default()).is_none());

        let header = HeaderInfo::new("Vocabulary Set A", "").with_footer("Room 4");
        let banner = BlockTemplate::header_block(&header).unwrap();
        assert_eq!(banner.paragraphs.len(), 1);
        assert!(BlockTemplate::footer_block(&header).is_some());
    }
}
