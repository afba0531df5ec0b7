mod common;

use common::{occurrences, vocabulary, GeneratedPdf, TestResult};
use quire::composer::{merge_all, PageNumberStyle};
use quire::render::{Chunk, ChunkRenderer, RenderOptions};
use quire::render_lopdf::LopdfRenderer;
use quire::HeaderInfo;

/// Renders `records` records and returns the PDF bytes plus its page count.
fn rendered(records: usize) -> (Vec<u8>, usize) {
    let chunk = Chunk::whole(vocabulary(records), HeaderInfo::default());
    let doc = LopdfRenderer::default().render(&chunk, &RenderOptions::default()).unwrap();
    let pages = doc.page_count();
    (doc.into_bytes(), pages)
}

#[test]
fn merged_page_count_is_the_sum_of_inputs() -> TestResult {
    let inputs: Vec<_> = [30, 50, 10].into_iter().map(rendered).collect();
    let expected: usize = inputs.iter().map(|(_, pages)| pages).sum();

    let merged = merge_all(inputs.iter().map(|(bytes, _)| bytes), Some(&PageNumberStyle::default()))?;
    assert_eq!(merged.page_count(), expected);

    let pdf = GeneratedPdf::from_merged(merged)?;
    assert_eq!(pdf.page_count(), expected);
    for k in 1..=expected {
        assert_eq!(occurrences(&pdf.page_content(k as u32), &format!("({} / {})", k, expected)), 1);
    }
    Ok(())
}

#[test]
fn merging_without_numbering_leaves_pages_unstamped() -> TestResult {
    let inputs: Vec<_> = [5, 5].into_iter().map(rendered).collect();
    let merged = merge_all(inputs.iter().map(|(bytes, _)| bytes), None)?;
    let pdf = GeneratedPdf::from_merged(merged)?;
    assert!(!pdf.all_content().contains(" / "));
    Ok(())
}
