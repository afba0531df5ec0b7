#![allow(dead_code)]

use lopdf::Document as LopdfDocument;
use quire::{ContentRecord, GenerationJob, HeaderInfo, MergedDocument, ViewMode};
use serde_json::json;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_merged(merged: MergedDocument) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(merged.into_bytes())
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// The decoded content stream of a 1-based page.
    pub fn page_content(&self, page: u32) -> String {
        let pages = self.doc.get_pages();
        let content = self.doc.get_page_content(pages[&page]).unwrap_or_default();
        String::from_utf8_lossy(&content).into_owned()
    }

    pub fn all_content(&self) -> String {
        (1..=self.page_count() as u32).map(|p| self.page_content(p)).collect()
    }

    /// Text of a 1-based page decoded through the fonts' ToUnicode maps,
    /// one line per text object.
    pub fn page_text(&self, page: u32) -> String {
        self.doc.extract_text(&[page]).unwrap_or_default()
    }

    /// Text of every page, each line preceded by a newline so whole lines
    /// can be matched as `"\n{line}\n"`.
    pub fn all_text(&self) -> String {
        let pages: Vec<u32> = (1..=self.page_count() as u32).collect();
        format!("\n{}", self.doc.extract_text(&pages).unwrap_or_default())
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// `n` vocabulary records named `word0..word{n-1}`.
pub fn vocabulary(n: usize) -> Vec<ContentRecord> {
    (0..n)
        .map(|i| {
            ContentRecord::new(
                json!({ "word": format!("word{i}"), "meaning": format!("meaning of word {i}") }),
                i,
            )
            .unwrap()
        })
        .collect()
}

pub fn vocabulary_job(n: usize, title: &str) -> GenerationJob {
    GenerationJob::from_records(
        vocabulary(n),
        HeaderInfo::new(title, "Weekly list").with_footer("Class copy"),
        ViewMode::WordList,
    )
}

/// Counts occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
