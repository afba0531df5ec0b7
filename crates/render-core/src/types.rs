use quire_types::{ContentRecord, HeaderInfo, ViewMode};

/// A contiguous slice of the input records, rendered as one intermediate document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Ordinal of this chunk, starting at 0.
    pub index: usize,
    /// Index of `records[0]` in the full input list.
    pub first_record: usize,
    pub records: Vec<ContentRecord>,
    /// Header metadata for this chunk. Only chunk 0 carries the title banner.
    pub header: HeaderInfo,
}

impl Chunk {
    /// A single chunk covering every record.
    pub fn whole(records: Vec<ContentRecord>, header: HeaderInfo) -> Self {
        Self { index: 0, first_record: 0, records, header }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub view_mode: ViewMode,
    /// Stamp "i / total" on every page. Disabled for chunks of a larger
    /// document, whose numbering is only known after the merge.
    pub page_numbers: bool,
    /// More chunks of the same document follow this one. A footer limited
    /// to the last page is then neither reserved nor drawn.
    pub continued: bool,
}

/// The binary artifact produced from one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    page_count: usize,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        Self { bytes, page_count }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
