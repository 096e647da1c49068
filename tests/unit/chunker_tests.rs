/*!
 * Tests for chunk planning through the public chunker API
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pseudostream::chunking::{validate_chunks, ChunkConfig, CodeChunker};

use crate::common;

const WORDS: &[&str] = &[
    "total", "value", "items", "compute", "the", "sum", "of", "each", "résumé", "naïve", "x", "y",
];

/// Random mix of code-like and prose-like lines, never longer than `max_line`
fn random_text(rng: &mut StdRng, lines: usize, max_line: usize) -> String {
    let mut text = String::new();
    for _ in 0..lines {
        let mut line = String::new();
        if rng.random_bool(0.3) {
            line.push_str("    ");
        }
        match rng.random_range(0..4) {
            0 => line.push_str(&format!("{} = {}", WORDS[rng.random_range(0..WORDS.len())], rng.random_range(0..1000))),
            1 => line.push_str(&format!("def f{}(a, b):", rng.random_range(0..100))),
            2 => {}
            _ => {
                for _ in 0..rng.random_range(1..8) {
                    line.push_str(WORDS[rng.random_range(0..WORDS.len())]);
                    line.push(' ');
                }
            }
        }
        while line.len() > max_line {
            line.pop();
        }
        text.push_str(&line);
        text.push('\n');
    }
    if rng.random_bool(0.5) {
        text.pop();
    }
    text
}

#[test]
fn test_chunk_withRandomInputs_shouldRoundTripWithinLimits() {
    common::init_test_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..60 {
        let max_chunk_size = rng.random_range(80..400);
        let config = ChunkConfig::with_limits(max_chunk_size, rng.random_range(3..20))
            .with_overlap(rng.random_range(0..64))
            .with_boundaries(rng.random_bool(0.5))
            .with_chunk_by_blocks(rng.random_bool(0.5));
        let line_count = rng.random_range(1..120);
        let text = random_text(&mut rng, line_count, max_chunk_size / 2);

        let chunks = CodeChunker::new(config).chunk(&text);
        assert!(validate_chunks(&chunks, &text), "round {} failed to round-trip", round);
        for chunk in &chunks {
            assert!(
                chunk.size() <= max_chunk_size,
                "round {}: chunk {} has {} bytes, limit {}",
                round,
                chunk.index,
                chunk.size(),
                max_chunk_size
            );
            assert_eq!(chunk.total_chunks, chunks.len());
        }
    }
}

#[test]
fn test_chunk_withValidSource_shouldUseSyntaxBoundaries() {
    let source: String = (0..12)
        .map(|i| format!("def handler_{i}(event):\n    payload = event.body\n    return payload\n\n"))
        .collect();
    let chunker = CodeChunker::new(ChunkConfig::with_limits(200, 50));

    let chunks = chunker.chunk(&source);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.metadata.ast_based);
        assert!(chunk.metadata.fallback_reason.is_none());
        assert!(chunk.content.starts_with("def handler_"));
        assert!(chunk.metadata.boundary_types.contains(&"function".to_string()));
    }
    assert!(validate_chunks(&chunks, &source));
}

#[test]
fn test_chunk_withPseudocode_shouldFallBackWithReason() {
    let text = common::pseudocode_document(20);
    let chunker = CodeChunker::new(ChunkConfig::with_limits(300, 40));

    let chunks = chunker.chunk(&text);
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.metadata.line_based));
    assert_eq!(chunks[0].metadata.fallback_reason.as_deref(), Some("syntax_error"));
    assert!(validate_chunks(&chunks, &text));
}

#[test]
fn test_chunk_lines_shouldBeContiguousAndOneBased() {
    let text = common::pseudocode_document(15);
    let chunks = CodeChunker::new(ChunkConfig::with_limits(256, 10).with_boundaries(false)).chunk(&text);

    assert_eq!(chunks[0].start_line, 1);
    for pair in chunks.windows(2) {
        assert_eq!(pair[1].start_line, pair[0].end_line + 1);
        assert_eq!(pair[1].start_byte, pair[0].end_byte);
    }
    assert_eq!(chunks.last().map(|c| c.end_line), Some(text.lines().count()));
    for chunk in &chunks {
        assert_eq!(chunk.end_line - chunk.start_line + 1, chunk.line_count());
    }
}

#[test]
fn test_stream_chunks_shouldReportTotalBeforeFirstChunk() {
    let text = common::pseudocode_document(30);
    let chunker = CodeChunker::new(ChunkConfig::with_limits(256, 20));

    let mut stream = chunker.stream_chunks(&text);
    let total = stream.total_chunks();
    assert_eq!(stream.len(), total);

    let first = stream.next().unwrap();
    assert_eq!(first.total_chunks, total);
    assert_eq!(stream.count() + 1, total);
}
