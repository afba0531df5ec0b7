use quire::{GenerationRequest, PipelineBuilder, PipelineError};
use std::env;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

// Mimalloc keeps RSS flat across many chunk-sized allocations.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Spawns a background thread that logs physical memory usage (RSS).
fn spawn_memory_monitor() {
    thread::spawn(|| {
        let mut max_usage = 0;
        let start = Instant::now();
        loop {
            if let Some(usage) = memory_stats::memory_stats() {
                let mb = usage.physical_mem / 1024 / 1024;
                max_usage = max_usage.max(mb);
                log::debug!(
                    "[Monitor] T+{:<3}s | RSS: {:<4} MB | Peak: {:<4} MB",
                    start.elapsed().as_secs(),
                    mb,
                    max_usage
                );
            }
            thread::sleep(Duration::from_secs(1));
        }
    });
}

/// Generates a PDF from a request file shaped like the HTTP body:
/// `{"data": [...], "headerInfo": {...}, "viewMode": "...", "unitNumber": 1}`.
fn main() -> Result<(), PipelineError> {
    env_logger::init();
    spawn_memory_monitor();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Generates a paginated PDF from a JSON request.");
        eprintln!();
        eprintln!("Usage: {} <path/to/request.json> [path/to/output.pdf]", args[0]);
        eprintln!();
        eprintln!("Without an output path the derived download filename is used.");
        std::process::exit(1);
    }

    let data_path = &args[1];
    println!("Loading request from {}", data_path);
    let request: GenerationRequest = serde_json::from_str(&fs::read_to_string(data_path)?)?;
    let job = request.into_job()?;
    let output_path = args.get(2).cloned().unwrap_or_else(|| job.filename());

    let mut builder = PipelineBuilder::new();
    if let Ok(chunk_size) = env::var("QUIRE_CHUNK_SIZE") {
        let chunk_size = chunk_size
            .parse()
            .map_err(|e| PipelineError::Config(format!("QUIRE_CHUNK_SIZE: {e}")))?;
        builder = builder.with_chunk_size(chunk_size);
    }
    if env::var("QUIRE_SYSTEM_FONTS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
        builder = builder.with_system_fonts(true);
    }
    if let Ok(path) = env::var("QUIRE_GENERATION_LOG") {
        builder = builder.with_log_file(path);
    }
    let pipeline = builder.build()?;

    println!("Generating {} records to {}...", job.records.len(), output_path);
    let start = Instant::now();
    match pipeline.generate_to_file(&job, &output_path)? {
        Some(pages) => println!("Wrote {} pages to {} in {:.2?}", pages, output_path, start.elapsed()),
        None => println!("No records in {}; nothing written.", data_path),
    }
    Ok(())
}
