/*!
 * Streaming translation pipeline.
 *
 * The pipeline drives chunks through the parse, translate and assemble
 * stages, either one at a time or with bounded parallelism:
 * - `progress`: progress snapshots and the periodic reporter
 * - `orchestrator`: `StreamingPipeline`, the chunk scheduler
 */

pub mod orchestrator;
pub mod progress;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stages::Block;

pub use orchestrator::{SequentialRun, StreamingPipeline};
pub use progress::{ProgressCallback, StreamingProgress};

/// Configuration for streaming runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Whether large inputs are chunked at all
    #[serde(default = "default_true")]
    pub enable_streaming: bool,

    /// Inputs smaller than this (bytes) bypass chunking
    #[serde(default = "default_min_size_for_streaming")]
    pub min_size_for_streaming: usize,

    /// Maximum chunk computations outstanding at once; 1 means sequential
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,

    /// Time allowed for one chunk in parallel mode
    #[serde(default = "default_chunk_timeout_ms")]
    pub chunk_timeout_ms: u64,

    /// Interval between progress reports
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Prime each chunk with the tail of the previous chunk's output
    #[serde(default = "default_true")]
    pub maintain_context_window: bool,

    /// Bytes of recent code kept as translation context
    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,

    /// Hold back dispatch until outstanding chunks are consumed
    #[serde(default = "default_true")]
    pub enable_backpressure: bool,

    /// Capacity of the completed-result queue
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Number of chunk workers running at once
    #[serde(default = "default_thread_pool_size")]
    pub thread_pool_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enable_streaming: true,
            min_size_for_streaming: default_min_size_for_streaming(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
            chunk_timeout_ms: default_chunk_timeout_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            maintain_context_window: true,
            context_window_size: default_context_window_size(),
            enable_backpressure: true,
            max_queue_size: default_max_queue_size(),
            thread_pool_size: default_thread_pool_size(),
        }
    }
}

impl StreamConfig {
    /// Configuration that processes one chunk at a time
    pub fn sequential() -> Self {
        Self {
            max_concurrent_chunks: 1,
            ..Default::default()
        }
    }

    /// Configuration that keeps up to `workers` chunks in flight
    pub fn parallel(workers: usize) -> Self {
        Self {
            max_concurrent_chunks: workers,
            thread_pool_size: workers,
            ..Default::default()
        }
    }

    /// Set the per-chunk timeout
    pub fn with_chunk_timeout(mut self, timeout_ms: u64) -> Self {
        self.chunk_timeout_ms = timeout_ms;
        self
    }

    /// Set the minimum input size that uses chunking
    pub fn with_min_size(mut self, min_size_for_streaming: usize) -> Self {
        self.min_size_for_streaming = min_size_for_streaming;
        self
    }

    /// Whether chunks run concurrently
    pub fn is_parallel(&self) -> bool {
        self.max_concurrent_chunks > 1
    }

    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }
}

fn default_true() -> bool {
    true
}

fn default_min_size_for_streaming() -> usize {
    100 * 1024
}

fn default_max_concurrent_chunks() -> usize {
    3
}

fn default_chunk_timeout_ms() -> u64 {
    30_000
}

fn default_progress_interval_ms() -> u64 {
    500
}

fn default_context_window_size() -> usize {
    1024
}

fn default_max_queue_size() -> usize {
    10
}

fn default_thread_pool_size() -> usize {
    4
}

/// Outcome of processing one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Index of the chunk
    pub index: usize,

    /// Whether the chunk was parsed; translation failures do not clear this
    pub success: bool,

    /// Blocks produced by the parser
    pub parsed_blocks: Option<Vec<Block>>,

    /// Blocks after translation, present only on success
    pub translated_blocks: Option<Vec<Block>>,

    /// Reason for failure, present only when `success` is false
    pub error: Option<String>,

    /// Non-fatal problems
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Wall time spent on the chunk
    pub processing_time_ms: f64,
}

impl ChunkResult {
    /// Create a failed result
    pub fn failed(index: usize, error: impl Into<String>, processing_time_ms: f64) -> Self {
        Self {
            index,
            success: false,
            parsed_blocks: None,
            translated_blocks: None,
            error: Some(error.into()),
            warnings: Vec::new(),
            processing_time_ms,
        }
    }

    /// Translated blocks, or an empty slice for a failed chunk
    pub fn blocks(&self) -> &[Block] {
        self.translated_blocks.as_deref().unwrap_or(&[])
    }
}

/// Approximate memory held by a pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Bytes resident in the result cache
    pub buffer_size_bytes: usize,

    /// Bytes held by the context window
    pub context_window_size_bytes: usize,

    /// Estimate for chunks currently in flight
    pub queue_size_estimate_bytes: usize,
}
