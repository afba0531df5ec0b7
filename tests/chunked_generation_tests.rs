mod common;

use common::{init_logger, occurrences, vocabulary_job, GeneratedPdf, TestResult};
use quire::layout::FooterRepeat;
use quire::{
    plan_chunks, CancellationToken, ChunkScheduler, ContentRecord, GenerationJob, HeaderInfo, PipelineConfig, ViewMode,
};
use serde_json::json;

fn fast_config(chunk_size: usize) -> PipelineConfig {
    PipelineConfig { chunk_size, inter_chunk_delay_ms: 0, ..PipelineConfig::default() }
}

#[test]
fn twelve_hundred_records_split_into_three_chunks() {
    let job = vocabulary_job(1200, "Vocabulary Set A");
    let chunks = plan_chunks(job.records.clone(), &job.header, 500);

    assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![500, 500, 200]);
    assert_eq!(chunks[0].header.title, "Vocabulary Set A");
    assert!(chunks[1].header.title.is_empty() && chunks[1].header.description.is_empty());
    assert!(chunks[2].header.title.is_empty() && chunks[2].header.description.is_empty());
}

#[tokio::test]
async fn chunked_output_is_continuous_and_numbered() -> TestResult {
    init_logger();
    let job = vocabulary_job(120, "Vocabulary Set A");
    let scheduler = ChunkScheduler::new(fast_config(50));

    let merged = scheduler.generate(&job, &CancellationToken::new()).await?.expect("records were given");
    let pdf = GeneratedPdf::from_merged(merged)?;
    let total = pdf.page_count();
    assert!(total >= 3);

    // Every page carries exactly one "k / T" label, in order.
    for k in 1..=total {
        let content = pdf.page_content(k as u32);
        assert_eq!(occurrences(&content, &format!("({} / {})", k, total)), 1, "page {k}");
    }

    // Records appear once each, in order, and the title banner only once.
    let all = pdf.all_text();
    let mut last = 0;
    for i in 0..120 {
        let label = format!("\n{}. word{}\n", i + 1, i);
        let at = all.find(&label).unwrap_or_else(|| panic!("missing {label:?}"));
        assert!(at >= last, "record {i} out of order");
        assert_eq!(occurrences(&all, &label), 1);
        last = at;
    }
    assert_eq!(occurrences(&all, "\nVocabulary Set A\n"), 1);
    Ok(())
}

#[tokio::test]
async fn last_page_footer_appears_only_on_the_final_page() -> TestResult {
    let mut job = vocabulary_job(150, "Footer check");
    job.header = job.header.with_footer("FOOTERMARK");
    let mut config = fast_config(50);
    config.policy.footer = FooterRepeat::LastPageOnly;

    let merged = ChunkScheduler::new(config).generate(&job, &CancellationToken::new()).await?.expect("records were given");
    let pdf = GeneratedPdf::from_merged(merged)?;
    let total = pdf.page_count();
    assert!(total > 3, "three chunks should span several pages");

    let with_footer: Vec<usize> = (1..=total).filter(|&k| pdf.page_text(k as u32).contains("FOOTERMARK")).collect();
    assert_eq!(with_footer, vec![total]);
    Ok(())
}

#[tokio::test]
async fn every_page_footer_appears_on_every_page_across_chunks() -> TestResult {
    let job = vocabulary_job(150, "Footer check");
    let merged = ChunkScheduler::new(fast_config(50)).generate(&job, &CancellationToken::new()).await?.expect("records were given");
    let pdf = GeneratedPdf::from_merged(merged)?;
    for k in 1..=pdf.page_count() {
        assert_eq!(occurrences(&pdf.page_text(k as u32), "Class copy"), 1, "page {k}");
    }
    Ok(())
}

#[tokio::test]
async fn non_latin_records_keep_their_text_across_chunks() -> TestResult {
    let records = (0..30)
        .map(|i| ContentRecord::new(json!({ "word": format!("слово{i}"), "meaning": "λέξη" }), i))
        .collect::<Result<Vec<_>, _>>()?;
    let job = GenerationJob::from_records(records, HeaderInfo::new("Словарь", "Λεξιλόγιο"), ViewMode::WordList);
    let merged = ChunkScheduler::new(fast_config(10)).generate(&job, &CancellationToken::new()).await?.expect("records were given");
    let all = GeneratedPdf::from_merged(merged)?.all_text();

    for i in 0..30 {
        assert_eq!(occurrences(&all, &format!("\n{}. слово{}\n", i + 1, i)), 1);
    }
    assert_eq!(occurrences(&all, "λέξη"), 30);
    assert!(!all.contains('?'));
    Ok(())
}

#[tokio::test]
async fn chunked_and_single_pass_produce_the_same_page_count_for_one_chunk() -> TestResult {
    let job = vocabulary_job(40, "Same");
    let single = ChunkScheduler::new(fast_config(500)).generate(&job, &CancellationToken::new()).await?;
    let chunked = ChunkScheduler::new(fast_config(40)).generate(&job, &CancellationToken::new()).await?;
    assert_eq!(single.map(|d| d.page_count()), chunked.map(|d| d.page_count()));
    Ok(())
}

#[tokio::test]
async fn empty_record_list_emits_nothing() -> TestResult {
    let job = vocabulary_job(0, "Empty");
    let out = ChunkScheduler::new(fast_config(500)).generate(&job, &CancellationToken::new()).await?;
    assert!(out.is_none());
    Ok(())
}
