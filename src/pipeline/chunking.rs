use quire_render_core::Chunk;
use quire_types::{ContentRecord, HeaderInfo};

/// Splits `records` into `ceil(N / chunk_size)` contiguous chunks.
///
/// Only the first chunk keeps the title banner; later chunks carry a header
/// with title and description blanked so the banner is drawn once. The
/// footer is kept on every chunk. A `chunk_size` of zero is treated as one.
pub fn plan_chunks(records: Vec<ContentRecord>, header: &HeaderInfo, chunk_size: usize) -> Vec<Chunk> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(records.len().div_ceil(size));
    let mut records = records.into_iter().peekable();
    let mut first_record = 0;

    while records.peek().is_some() {
        let batch: Vec<ContentRecord> = records.by_ref().take(size).collect();
        let index = chunks.len();
        let header = if index == 0 { header.clone() } else { header.without_banner() };
        let len = batch.len();
        chunks.push(Chunk { index, first_record, records: batch, header });
        first_record += len;
    }
    chunks
}
