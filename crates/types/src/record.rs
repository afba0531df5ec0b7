//! Input data model: the records handed over by the authoring layer, the
//! shared header metadata, and the view mode that picks a block template.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("`data` is missing")]
    MissingData,

    #[error("`data` must be an array, got {0}")]
    NotAnArray(&'static str),

    #[error("record #{index} must be an object, got {kind}")]
    NotAnObject { index: usize, kind: &'static str },

    #[error("unknown view mode '{0}'")]
    UnknownViewMode(String),
}

/// One opaque input unit (a vocabulary entry, an exam question, ...).
///
/// The engine only reads fields through [`ContentRecord::text`] and
/// [`ContentRecord::list`]; the shape of a record belongs to the authoring
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRecord(Value);

impl ContentRecord {
    /// Wraps a JSON object. Non-objects are rejected.
    pub fn new(value: Value, index: usize) -> Result<Self, RecordError> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(RecordError::NotAnObject { index, kind: json_kind(&value) })
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the first non-empty scalar field among `keys`, rendered as text.
    pub fn text(&self, keys: &[&str]) -> Option<Cow<'_, str>> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        })
    }

    /// Returns the non-empty string items of the first array field among `keys`.
    pub fn list(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .find_map(|key| self.0.get(*key)?.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Validates a raw `data` payload and converts it into records, preserving order.
pub fn records_from_value(data: Option<&Value>) -> Result<Vec<ContentRecord>, RecordError> {
    let data = data.ok_or(RecordError::MissingData)?;
    let items = data
        .as_array()
        .ok_or_else(|| RecordError::NotAnArray(json_kind(data)))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ContentRecord::new(item.clone(), index))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Header metadata shared by every chunk of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderInfo {
    pub title: String,
    pub description: String,
    pub footer_left: String,
}

impl HeaderInfo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            footer_left: String::new(),
        }
    }

    pub fn with_footer(mut self, footer_left: impl Into<String>) -> Self {
        self.footer_left = footer_left.into();
        self
    }

    /// True when there is no title banner to draw.
    pub fn banner_is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    pub fn footer_is_empty(&self) -> bool {
        self.footer_left.trim().is_empty()
    }

    /// A copy with title and description blanked and every other field kept.
    pub fn without_banner(&self) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            ..self.clone()
        }
    }

    /// A copy with the footer text blanked.
    pub fn without_footer(&self) -> Self {
        Self {
            footer_left: String::new(),
            ..self.clone()
        }
    }
}

/// Selects the block template used to lay out each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    WordList,
    Flashcards,
    Quiz,
}

impl ViewMode {
    /// Human-readable label, used in derived filenames.
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::WordList => "Word List",
            ViewMode::Flashcards => "Flashcards",
            ViewMode::Quiz => "Quiz",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "wordList" | "word-list" | "list" => Ok(ViewMode::WordList),
            "flashcards" | "cards" => Ok(ViewMode::Flashcards),
            "quiz" | "test" => Ok(ViewMode::Quiz),
            other => Err(RecordError::UnknownViewMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_keep_input_order() {
        let data = json!([{ "word": "a" }, { "word": "b" }, { "word": "c" }]);
        let records = records_from_value(Some(&data)).unwrap();
        let words: Vec<_> = records
            .iter()
            .map(|r| r.text(&["word"]).unwrap().into_owned())
            .collect();
        assert_eq!(words, ["a", "b", "c"]);
    }

    #[test]
    fn rejects_missing_and_non_array_data() {
        assert_eq!(records_from_value(None), Err(RecordError::MissingData));
        assert_eq!(
            records_from_value(Some(&json!({ "word": "a" }))),
            Err(RecordError::NotAnArray("an object"))
        );
        assert_eq!(
            records_from_value(Some(&json!([{}, 3]))),
            Err(RecordError::NotAnObject { index: 1, kind: "a number" })
        );
    }

    #[test]
    fn text_skips_blank_fields_and_formats_numbers() {
        let record = ContentRecord::new(json!({ "term": " ", "word": 42 }), 0).unwrap();
        assert_eq!(record.text(&["term", "word"]).as_deref(), Some("42"));
        assert_eq!(record.text(&["missing"]), None);
    }

    #[test]
    fn header_without_banner_keeps_footer() {
        let header = HeaderInfo::new("Vocabulary Set A", "Week 1").with_footer("Class 3");
        let blank = header.without_banner();
        assert!(blank.banner_is_empty());
        assert_eq!(blank.footer_left, "Class 3");

        let footless = header.without_footer();
        assert!(footless.footer_is_empty());
        assert_eq!(footless.title, "Vocabulary Set A");
    }

    #[test]
    fn header_deserializes_camel_case_with_defaults() {
        let header: HeaderInfo = serde_json::from_value(json!({ "footerLeft": "x" })).unwrap();
        assert_eq!(header.footer_left, "x");
        assert!(header.title.is_empty());
    }

    #[test]
    fn view_mode_parses_known_names() {
        assert_eq!("quiz".parse::<ViewMode>().unwrap(), ViewMode::Quiz);
        assert_eq!("".parse::<ViewMode>().unwrap(), ViewMode::WordList);
        assert!("poster".parse::<ViewMode>().is_err());
    }
}
