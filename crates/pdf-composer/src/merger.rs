use crate::{merge_documents, stamp_page_numbers, ComposerError, PageNumberStyle};
use lopdf::Document;

/// Final output of a merge: the serialized PDF and its page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    bytes: Vec<u8>,
    page_count: usize,
}

impl MergedDocument {
    /// Wraps an already finished document, such as a single-chunk render
    /// that was numbered by its renderer.
    pub fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        Self { bytes, page_count }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

/// Accumulates PDF documents one at a time.
///
/// Each appended document is parsed and folded into the running result
/// immediately, so only the accumulated document and the one being merged are
/// held in memory at once.
#[derive(Default)]
pub struct DocumentMerger {
    doc: Option<Document>,
    page_count: usize,
    inputs: usize,
}

impl DocumentMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `bytes` and appends its pages after the pages merged so far.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, ComposerError> {
        let source = Document::load_mem(bytes)?;
        let added = match self.doc.as_mut() {
            Some(target) => merge_documents(target, source, false)?,
            None => {
                let pages = source.get_pages().len();
                self.doc = Some(source);
                pages
            }
        };
        self.page_count += added;
        self.inputs += 1;
        log::debug!(
            "[COMPOSER] Appended document #{} ({} pages, {} total).",
            self.inputs,
            added,
            self.page_count
        );
        Ok(added)
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    /// Optionally stamps continuous page numbers, then serializes the result.
    pub fn finish(self, numbering: Option<&PageNumberStyle>) -> Result<MergedDocument, ComposerError> {
        let mut doc = self.doc.ok_or(ComposerError::Empty)?;
        if let Some(style) = numbering {
            stamp_page_numbers(&mut doc, style)?;
        }
        doc.prune_objects();
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(MergedDocument { bytes, page_count: self.page_count })
    }
}

/// Merges `documents` in order into one PDF.
pub fn merge_all<I, B>(documents: I, numbering: Option<&PageNumberStyle>) -> Result<MergedDocument, ComposerError>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut merger = DocumentMerger::new();
    for bytes in documents {
        merger.append(bytes.as_ref())?;
    }
    merger.finish(numbering)
}
