/*!
 * Chunk data model and chunking configuration.
 *
 * A `Chunk` is an immutable, positioned slice of the input. Positions are
 * expressed both as 1-based inclusive line numbers and as byte offsets into
 * the UTF-8 source, so that `&source[chunk.start_byte..chunk.end_byte]`
 * is always exactly `chunk.content`.
 */

use serde::{Deserialize, Serialize};

/// Configuration for the code chunker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum size of one chunk in bytes
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Size a chunk must reach before a new definition may start a new chunk
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    /// Bytes of the previous chunk repeated at the start of the next one (line fallback only)
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,

    /// Split only at top-level statement boundaries when the input parses
    #[serde(default = "default_true")]
    pub respect_boundaries: bool,

    /// Maximum number of lines in one chunk
    #[serde(default = "default_max_lines_per_chunk")]
    pub max_lines_per_chunk: usize,

    /// Start a new chunk at each function or class once `min_chunk_size` is reached
    #[serde(default = "default_true")]
    pub chunk_by_blocks: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            min_chunk_size: default_min_chunk_size(),
            overlap_size: default_overlap_size(),
            respect_boundaries: true,
            max_lines_per_chunk: default_max_lines_per_chunk(),
            chunk_by_blocks: true,
        }
    }
}

impl ChunkConfig {
    /// Create a configuration with the given size limits and no overlap
    pub fn with_limits(max_chunk_size: usize, max_lines_per_chunk: usize) -> Self {
        Self {
            max_chunk_size,
            max_lines_per_chunk,
            min_chunk_size: max_chunk_size.min(default_min_chunk_size()),
            overlap_size: 0,
            ..Default::default()
        }
    }

    /// Set the overlap size
    pub fn with_overlap(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    /// Enable or disable boundary-aware splitting
    pub fn with_boundaries(mut self, respect_boundaries: bool) -> Self {
        self.respect_boundaries = respect_boundaries;
        self
    }

    /// Enable or disable splitting at definitions once `min_chunk_size` is reached
    pub fn with_chunk_by_blocks(mut self, chunk_by_blocks: bool) -> Self {
        self.chunk_by_blocks = chunk_by_blocks;
        self
    }
}

fn default_max_chunk_size() -> usize {
    4096
}

fn default_min_chunk_size() -> usize {
    512
}

fn default_overlap_size() -> usize {
    256
}

fn default_max_lines_per_chunk() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// How a chunk was produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The whole input fit into one chunk
    #[serde(default)]
    pub single_chunk: bool,

    /// The chunk was cut at syntax-tree statement boundaries
    #[serde(default)]
    pub ast_based: bool,

    /// The chunk was cut at fixed line granularity
    #[serde(default)]
    pub line_based: bool,

    /// The chunk starts with bytes repeated from the previous chunk
    #[serde(default)]
    pub has_overlap: bool,

    /// Number of leading bytes repeated from the previous chunk
    #[serde(default)]
    pub overlap_bytes: usize,

    /// Kinds of top-level statements contained in an AST-based chunk
    #[serde(default)]
    pub boundary_types: Vec<String>,

    /// Why boundary-aware splitting was abandoned, when it was
    #[serde(default)]
    pub fallback_reason: Option<String>,
}

/// An immutable, positioned slice of the input text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text of the chunk, including any overlap prefix
    pub content: String,

    /// First line covered by `content` (1-based)
    pub start_line: usize,

    /// Last line covered by `content` (1-based, inclusive)
    pub end_line: usize,

    /// Byte offset of `content` in the source
    pub start_byte: usize,

    /// Byte offset one past the end of `content` in the source
    pub end_byte: usize,

    /// Position of this chunk in its sequence
    pub index: usize,

    /// Number of chunks in the sequence
    pub total_chunks: usize,

    /// How the chunk was produced
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Size of the content in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Number of lines in the content
    ///
    /// A trailing newline terminates the last line rather than opening a new one.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Content without the overlap prefix repeated from the previous chunk
    pub fn own_content(&self) -> &str {
        self.content
            .get(self.metadata.overlap_bytes..)
            .unwrap_or(&self.content)
    }

    /// Whether this is the last chunk of its sequence
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total_chunks
    }
}
