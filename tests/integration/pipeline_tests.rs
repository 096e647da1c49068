/*!
 * Integration tests for sequential and parallel pipeline runs
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use parking_lot::Mutex;

use pseudostream::app_config::Config;
use pseudostream::buffer::BufferConfig;
use pseudostream::chunking::{ChunkConfig, CodeChunker};
use pseudostream::pipeline::{ChunkResult, StreamConfig, StreamingPipeline, StreamingProgress};
use pseudostream::stages::{BlockType, CodeTranslator, MockTranslator, Stages};

use crate::common::{self, DelayedTranslator};

fn pipeline_with(config: StreamConfig, chunk_config: ChunkConfig, stages: Stages) -> StreamingPipeline {
    StreamingPipeline::new(config, chunk_config, BufferConfig::default(), stages)
}

fn line_chunks(max_chunk_size: usize) -> ChunkConfig {
    ChunkConfig::with_limits(max_chunk_size, 100)
}

#[test]
fn test_run_sequential_shouldYieldEveryChunkInOrder() {
    common::init_test_logging();
    let text = common::pseudocode_document(12);
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        line_chunks(256),
        common::working_stages(),
    );

    let run = pipeline.run_sequential(&text);
    let total = run.total_chunks();
    let results: Vec<ChunkResult> = run.collect();

    assert!(total > 1);
    assert_eq!(results.len(), total);
    for (position, result) in results.iter().enumerate() {
        assert_eq!(result.index, position);
        assert!(result.success, "chunk {} failed: {:?}", position, result.error);
        assert!(result.blocks().iter().all(|b| b.kind != BlockType::English));
    }

    let progress = pipeline.progress();
    assert!(progress.is_complete());
    assert_eq!(progress.bytes_processed, text.len());
    assert!((progress.percentage() - 100.0).abs() < f64::EPSILON);
    assert!(progress.errors.is_empty());
}

#[test]
fn test_assemble_streamed_afterSequentialRun_shouldTranslateEverySection() {
    let text = common::pseudocode_document(8);
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        line_chunks(200),
        common::working_stages(),
    );

    assert_eq!(pipeline.run_sequential(&text).count(), pipeline.progress().total_chunks);
    let output = pipeline.assemble_streamed();

    for i in 0..8 {
        assert!(output.contains(&format!("def step_{}(values):", i)));
        assert!(output.contains(&MockTranslator::expected_output(&format!(
            "add every value to total number {}",
            i
        ))));
    }
    assert!(!output.contains("\nadd every value"));
}

#[tokio::test]
async fn test_stream_translate_parallel_shouldMatchSequentialAssembly() {
    common::init_test_logging();
    let text = common::pseudocode_document(16);

    let sequential = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        line_chunks(200),
        common::working_stages(),
    );
    let expected_count = sequential.stream_translate(&text, None).count().await;
    let expected = sequential.assemble_streamed();

    let translator = DelayedTranslator::new(5)
        .with_delay(0, 120)
        .with_delay(1, 60)
        .with_delay(3, 90);
    let parallel = pipeline_with(
        StreamConfig::parallel(4).with_min_size(0),
        line_chunks(200),
        common::stages_with(Arc::new(translator)),
    );
    let results: Vec<ChunkResult> = parallel.stream_translate(&text, None).collect().await;

    assert_eq!(results.len(), expected_count);
    let mut indices: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_ne!(indices[0], 0, "slow first chunk should not complete first");
    indices.sort_unstable();
    assert_eq!(indices, (0..expected_count).collect::<Vec<_>>());
    assert_eq!(parallel.assemble_streamed(), expected);
    assert!(parallel.progress().is_complete());
}

#[test]
fn test_stream_translate_withUnbalancedChunk_shouldFailOnlyThatChunk() {
    let text = "x = 1\ny = 2\nz = 3\nvalues = [1, 2\ncount the values\nprint the total\na = 4\nb = 5\nc = 6\n";
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        ChunkConfig::with_limits(64, 3).with_boundaries(false),
        common::working_stages(),
    );

    let results: Vec<ChunkResult> =
        tokio_test::block_on(async { pipeline.stream_translate(text, None).collect().await });

    assert_eq!(results.len(), 3);
    let failed: Vec<&ChunkResult> = results.iter().filter(|r| !r.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].index, 1);
    assert!(failed[0].error.as_deref().is_some_and(|e| e.contains("Parse error")));
    assert!(failed[0].translated_blocks.is_none());

    let progress = pipeline.progress();
    assert_eq!(progress.processed_chunks, 3);
    assert_eq!(progress.errors.len(), 1);
    assert!(progress.errors[0].starts_with("Chunk 1: Parse error"));

    let output = pipeline.assemble_streamed();
    assert!(output.contains("x = 1"));
    assert!(output.contains("c = 6"));
    assert!(!output.contains("values = [1, 2"));
}

#[tokio::test]
async fn test_stream_translate_cancelAfterFirstResult_shouldStopPromptly() {
    let text = common::pseudocode_document(10);
    let translator = DelayedTranslator::new(300).with_delay(0, 0);
    let pipeline = pipeline_with(
        StreamConfig::parallel(2).with_min_size(0),
        line_chunks(128),
        common::stages_with(Arc::new(translator)),
    );

    let mut stream = pipeline.stream_translate(&text, None);
    let first = stream.next().await.expect("first result");
    assert_eq!(first.index, 0);

    let cancelled_at = Instant::now();
    pipeline.cancel();
    let rest: Vec<ChunkResult> = stream.collect().await;

    assert!(cancelled_at.elapsed() < Duration::from_millis(250));
    let total = pipeline.progress().total_chunks;
    assert!(1 + rest.len() < total, "{} of {} chunks yielded", 1 + rest.len(), total);
    assert!(pipeline.is_cancelled());
}

#[tokio::test]
async fn test_stream_translate_withSlowChunk_shouldTimeOutWithoutCaching() {
    let text = common::pseudocode_document(6);
    let translator = DelayedTranslator::new(0).with_delay(1, 400);
    let pipeline = pipeline_with(
        StreamConfig::parallel(2).with_min_size(0).with_chunk_timeout(100),
        line_chunks(200),
        common::stages_with(Arc::new(translator)),
    );

    let results: Vec<ChunkResult> = pipeline.stream_translate(&text, None).collect().await;
    let total = pipeline.progress().total_chunks;
    assert_eq!(results.len(), total);

    let timed_out = results.iter().find(|r| r.index == 1).expect("chunk 1 result");
    assert!(!timed_out.success);
    assert!(timed_out
        .error
        .as_deref()
        .is_some_and(|e| e.contains("timed out after 100 ms")));

    // The abandoned worker finishes later and must not be committed
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(pipeline.cache_stats().chunks, total - 1);
}

#[test]
fn test_progress_callback_shouldReportMonotonicProgress() {
    let text = common::pseudocode_document(12);
    let seen: Arc<Mutex<Vec<StreamingProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let mut config = StreamConfig::sequential().with_min_size(0);
    config.progress_interval_ms = 1;
    let translator: Arc<dyn CodeTranslator> = Arc::new(MockTranslator::slow(5));
    let pipeline = pipeline_with(config, line_chunks(200), common::stages_with(translator));

    let sink = Arc::clone(&seen);
    pipeline.add_progress_callback(Arc::new(move |progress: &StreamingProgress| {
        sink.lock().push(progress.clone());
    }));
    let total = pipeline.run_sequential(&text).count();

    let seen = seen.lock();
    assert!(!seen.is_empty());
    for pair in seen.windows(2) {
        assert!(pair[0].processed_chunks <= pair[1].processed_chunks);
        assert!(pair[0].bytes_processed <= pair[1].bytes_processed);
    }
    let last = seen.last().expect("final snapshot");
    assert_eq!(last.processed_chunks, total);
    assert!(last.is_complete());
}

#[test]
fn test_memory_usage_afterRun_shouldReportCacheAndContext() {
    let text = common::pseudocode_document(6);
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        line_chunks(200),
        common::working_stages(),
    );
    assert_eq!(pipeline.memory_usage().buffer_size_bytes, 0);

    let _ = pipeline.run_sequential(&text).count();
    let usage = pipeline.memory_usage();

    assert!(usage.buffer_size_bytes > 0);
    assert!(usage.context_window_size_bytes > 0);
    assert!(usage.context_window_size_bytes <= pipeline.config().context_window_size);
    assert_eq!(usage.queue_size_estimate_bytes, 0);
}

#[test]
fn test_run_document_belowThreshold_shouldProcessWhole() {
    let text = common::pseudocode_document(6);
    let pipeline = pipeline_with(StreamConfig::sequential(), line_chunks(128), common::working_stages());

    let run = pipeline.run_document(&text);
    assert_eq!(run.total_chunks(), 1);
    let results: Vec<ChunkResult> = run.collect();
    assert!(results[0].success);
    assert_eq!(results[0].blocks().len(), 12);
}

fn assemble_sequential(text: &str, chunk_config: ChunkConfig) -> (String, StreamingProgress) {
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        chunk_config,
        common::working_stages(),
    );
    let results: Vec<ChunkResult> = pipeline.run_sequential(text).collect();
    assert!(results.len() > 1, "input should span several chunks");
    (pipeline.assemble_streamed(), pipeline.progress())
}

#[test]
fn test_assemble_streamed_withOverlap_shouldNotRepeatOverlappedLines() {
    let text = common::pseudocode_document(8);

    let (with_overlap, progress) =
        assemble_sequential(&text, ChunkConfig::with_limits(200, 100).with_overlap(64));
    let (without_overlap, _) = assemble_sequential(&text, ChunkConfig::with_limits(200, 100));

    assert!(progress.errors.is_empty(), "{:?}", progress.errors);
    for i in 0..8 {
        assert_eq!(with_overlap.matches(&format!("def step_{}(values):", i)).count(), 1);
        assert_eq!(with_overlap.matches(&format!("    total = {}\n", i)).count(), 1);
    }
    assert_eq!(
        common::content_lines(&with_overlap),
        common::content_lines(&without_overlap)
    );
}

#[test]
fn test_run_sequential_withOpenBracketInContextTail_shouldParseChunkAlone() {
    let call: String = std::iter::once("result = compute(".to_string())
        .chain((10..22).map(|i| format!("    {},", i)))
        .chain(std::iter::once(")".to_string()))
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!("{}\ny = 2\nz = 3\n", call);
    let pipeline = pipeline_with(
        StreamConfig::sequential().with_min_size(0),
        ChunkConfig::with_limits(120, 14).with_boundaries(false),
        common::working_stages(),
    );

    let results: Vec<ChunkResult> = pipeline.run_sequential(&text).collect();

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.success, "chunk {} failed: {:?}", result.index, result.error);
    }
    assert_eq!(results[1].blocks()[0].line_numbers, (15, 16));
    assert!(pipeline.progress().errors.is_empty());
    assert_eq!(pipeline.assemble_streamed(), format!("{}\n\ny = 2\nz = 3\n", call));
}

#[test]
fn test_run_sequential_withDefaultChunking_shouldTranslateBracketedDocument() {
    common::init_test_logging();
    let text = common::bracketed_document(60);
    let chunking = Config::default().chunking;

    let chunks = CodeChunker::new(chunking.clone()).chunk(&text);
    assert_eq!(chunks.len(), 3);
    assert!(chunks[1].metadata.has_overlap);
    assert_eq!(chunks[1].metadata.fallback_reason.as_deref(), Some("syntax_error"));

    let (with_overlap, progress) = assemble_sequential(&text, chunking.clone());
    let (without_overlap, _) = assemble_sequential(&text, chunking.with_overlap(0));

    assert!(progress.errors.is_empty(), "{:?}", progress.errors);
    assert_eq!(progress.processed_chunks, 3);
    for i in 0..60 {
        let call = format!("value_{:04} = compute_total(", i);
        assert_eq!(with_overlap.matches(&call).count(), 1, "{}", call);
    }
    assert_eq!(
        common::content_lines(&with_overlap),
        common::content_lines(&without_overlap)
    );
}

#[tokio::test]
async fn test_stream_translate_parallel_withDefaultChunking_shouldMatchSequential() {
    let text = common::bracketed_document(60);
    let chunking = Config::default().chunking;
    let (expected, _) = assemble_sequential(&text, chunking.clone());

    let pipeline = pipeline_with(
        StreamConfig::parallel(3).with_min_size(0),
        chunking,
        common::working_stages(),
    );
    let results: Vec<ChunkResult> = pipeline.stream_translate(&text, None).collect().await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(pipeline.assemble_streamed(), expected);
}
