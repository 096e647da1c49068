/*!
 * Boundary-aware code chunker.
 *
 * Splitting strategy, in order:
 * 1. Inputs that fit in `max_chunk_size` become one chunk.
 * 2. Syntax-tree splitting at top-level statements, packing whole statements
 *    into chunks bounded by bytes and lines.
 * 3. Line-based splitting, which never fails and optionally repeats the tail
 *    of each chunk at the start of the next one.
 *
 * The chunker is stateless between calls.
 */

use log::debug;

use super::boundaries::{top_level_units, BoundaryUnit, FallbackReason, LineIndex};
use super::model::{Chunk, ChunkConfig, ChunkMetadata};

/// Byte span of a chunk decided before its content is materialized
#[derive(Debug, Clone)]
struct PlannedChunk {
    start_byte: usize,
    end_byte: usize,
    metadata: ChunkMetadata,
}

/// Splits source text into bounded chunks
#[derive(Debug, Clone, Default)]
pub struct CodeChunker {
    config: ChunkConfig,
}

impl CodeChunker {
    /// Create a new chunker
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Get the chunker configuration
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split text into chunks
    ///
    /// Empty and whitespace-only input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.stream_chunks(text).collect()
    }

    /// Split text into chunks, materializing each chunk's content on demand
    ///
    /// Chunk positions are planned up front so `total_chunks` is known for the
    /// first element. The stream cannot be resumed; call again to restart.
    pub fn stream_chunks<'a>(&self, text: &'a str) -> ChunkStream<'a> {
        let index = LineIndex::new(text);
        let plan = self.plan(text, &index);
        ChunkStream {
            text,
            index,
            total: plan.len(),
            plan: plan.into_iter().enumerate(),
        }
    }

    fn plan(&self, text: &str, index: &LineIndex) -> Vec<PlannedChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        if text.len() <= self.config.max_chunk_size {
            return vec![PlannedChunk {
                start_byte: 0,
                end_byte: text.len(),
                metadata: ChunkMetadata {
                    single_chunk: true,
                    ..Default::default()
                },
            }];
        }

        if !self.config.respect_boundaries {
            debug!("Boundary splitting disabled, using line-based chunking");
            return self.plan_by_lines(text, index, None);
        }

        match top_level_units(text, index) {
            Ok(units) => match self.plan_by_boundaries(&units, index) {
                Some(plan) => {
                    debug!(
                        "Chunked {} bytes into {} AST-based chunks",
                        text.len(),
                        plan.len()
                    );
                    plan
                }
                None => {
                    debug!("Top-level statement exceeds chunk limits, falling back to lines");
                    self.plan_by_lines(text, index, Some(FallbackReason::OversizedBoundary))
                }
            },
            Err(reason) => {
                debug!("Falling back to line-based chunking: {}", reason.as_str());
                self.plan_by_lines(text, index, Some(reason))
            }
        }
    }

    /// Pack whole top-level statements into chunks
    ///
    /// Returns `None` when one statement alone exceeds the chunk limits.
    fn plan_by_boundaries(
        &self,
        units: &[BoundaryUnit],
        index: &LineIndex,
    ) -> Option<Vec<PlannedChunk>> {
        let max_bytes = self.config.max_chunk_size.max(1);
        let max_lines = self.config.max_lines_per_chunk.max(1);

        let mut plan = Vec::new();
        let mut current: Option<(usize, usize, usize, Vec<String>)> = None;

        for unit in units {
            let (unit_start, unit_end) = unit.byte_span(index);
            let unit_bytes = unit_end - unit_start;
            let unit_lines = unit.line_count();
            if unit_bytes > max_bytes || unit_lines > max_lines {
                return None;
            }

            if let Some((start, end, lines, kinds)) = current.take() {
                let overflows = end - start + unit_bytes > max_bytes || lines + unit_lines > max_lines;
                let starts_block = self.config.chunk_by_blocks
                    && unit.is_definition()
                    && end - start >= self.config.min_chunk_size;

                if overflows || starts_block {
                    plan.push(ast_chunk(start, end, kinds));
                    current = Some((unit_start, unit_end, unit_lines, vec![unit.kind.to_string()]));
                } else {
                    let mut kinds = kinds;
                    if !kinds.iter().any(|k| k == unit.kind) {
                        kinds.push(unit.kind.to_string());
                    }
                    current = Some((start, unit_end, lines + unit_lines, kinds));
                }
            } else {
                current = Some((unit_start, unit_end, unit_lines, vec![unit.kind.to_string()]));
            }
        }

        if let Some((start, end, _, kinds)) = current {
            plan.push(ast_chunk(start, end, kinds));
        }
        Some(plan)
    }

    /// Pack whole lines into chunks; a single oversized line becomes its own chunk
    fn plan_by_lines(
        &self,
        text: &str,
        index: &LineIndex,
        reason: Option<FallbackReason>,
    ) -> Vec<PlannedChunk> {
        let max_bytes = self.config.max_chunk_size.max(1);
        let max_lines = self.config.max_lines_per_chunk.max(1);
        let overlap_cap = self.config.overlap_size.min(max_bytes / 2);
        let overlap_line_cap = max_lines / 2;

        let mut plan = Vec::new();
        let mut line = 0;
        let mut previous: Option<(usize, usize)> = None;

        while line < index.line_count() {
            let (own_start, first_end) = index.line_span(line);

            let mut start = match previous {
                Some((prev_start, prev_end)) => overlap_start(
                    text,
                    index,
                    prev_start,
                    prev_end,
                    overlap_cap,
                    overlap_line_cap,
                ),
                None => own_start,
            };
            let overlap_lines = if start < own_start {
                line - index.line_at(start)
            } else {
                0
            };

            let mut byte_budget = max_bytes - (own_start - start);
            let mut line_budget = max_lines.saturating_sub(overlap_lines);
            if first_end - own_start > byte_budget || line_budget == 0 {
                // No room for the overlap next to the first line
                start = own_start;
                byte_budget = max_bytes;
                line_budget = max_lines;
            }

            let mut end = first_end;
            let mut taken = 1;
            line += 1;
            while line < index.line_count() && taken < line_budget {
                let (_, next_end) = index.line_span(line);
                if next_end - own_start > byte_budget {
                    break;
                }
                end = next_end;
                taken += 1;
                line += 1;
            }

            let overlap_bytes = own_start - start;
            plan.push(PlannedChunk {
                start_byte: start,
                end_byte: end,
                metadata: ChunkMetadata {
                    line_based: true,
                    has_overlap: overlap_bytes > 0,
                    overlap_bytes,
                    fallback_reason: reason.map(|r| r.as_str().to_string()),
                    ..Default::default()
                },
            });
            previous = Some((own_start, end));
        }

        plan
    }
}

fn ast_chunk(start_byte: usize, end_byte: usize, boundary_types: Vec<String>) -> PlannedChunk {
    PlannedChunk {
        start_byte,
        end_byte,
        metadata: ChunkMetadata {
            ast_based: true,
            boundary_types,
            ..Default::default()
        },
    }
}

/// Start of the overlap region repeated from the previous chunk's own content
///
/// Prefers the longest run of whole trailing lines that fits in `byte_cap`
/// bytes and `line_cap` lines, otherwise a byte suffix of the last line cut
/// at a character boundary. Returns `prev_end` when no overlap applies.
fn overlap_start(
    text: &str,
    index: &LineIndex,
    prev_start: usize,
    prev_end: usize,
    byte_cap: usize,
    line_cap: usize,
) -> usize {
    if byte_cap == 0 || line_cap == 0 || prev_end <= prev_start {
        return prev_end;
    }

    let first_line = index.line_at(prev_start);
    let mut line = index.line_at(prev_end - 1);
    let mut start = prev_end;
    let mut lines = 0;
    loop {
        let (line_start, _) = index.line_span(line);
        if line_start < prev_start || prev_end - line_start > byte_cap || lines >= line_cap {
            break;
        }
        start = line_start;
        lines += 1;
        if line == first_line {
            break;
        }
        line -= 1;
    }

    if start == prev_end {
        let mut cut = prev_end.saturating_sub(byte_cap).max(prev_start);
        while cut < prev_end && !text.is_char_boundary(cut) {
            cut += 1;
        }
        start = cut;
    }
    start
}

/// Lazy sequence of chunks produced by [`CodeChunker::stream_chunks`]
pub struct ChunkStream<'a> {
    text: &'a str,
    index: LineIndex,
    total: usize,
    plan: std::iter::Enumerate<std::vec::IntoIter<PlannedChunk>>,
}

impl ChunkStream<'_> {
    /// Number of chunks the stream yields in total
    pub fn total_chunks(&self) -> usize {
        self.total
    }
}

impl Iterator for ChunkStream<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let (position, planned) = self.plan.next()?;
        let (start_line, end_line) = self.index.line_range(planned.start_byte, planned.end_byte);
        Some(Chunk {
            content: self.text[planned.start_byte..planned.end_byte].to_string(),
            start_line,
            end_line,
            start_byte: planned.start_byte,
            end_byte: planned.end_byte,
            index: position,
            total_chunks: self.total,
            metadata: planned.metadata,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.plan.size_hint()
    }
}

impl ExactSizeIterator for ChunkStream<'_> {}

/// Check that chunks are positioned consistently and reproduce the original
///
/// Each chunk's content must equal its byte range of `original`, and the
/// chunks' contents with their overlap prefixes removed must concatenate to
/// exactly `original`.
pub fn validate_chunks(chunks: &[Chunk], original: &str) -> bool {
    if chunks.is_empty() {
        return original.trim().is_empty();
    }

    let mut rebuilt = String::with_capacity(original.len());
    for (position, chunk) in chunks.iter().enumerate() {
        if chunk.index != position || chunk.total_chunks != chunks.len() {
            return false;
        }
        if original.get(chunk.start_byte..chunk.end_byte) != Some(chunk.content.as_str()) {
            return false;
        }
        let Some(own) = chunk.content.get(chunk.metadata.overlap_bytes..) else {
            return false;
        };
        if chunk.start_byte + chunk.metadata.overlap_bytes != rebuilt.len() {
            return false;
        }
        rebuilt.push_str(own);
    }

    rebuilt == original
}
