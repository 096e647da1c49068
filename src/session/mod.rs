/*!
 * Real-time streaming translation sessions.
 *
 * A session consumes input incrementally and yields translated text as soon
 * as a unit of input is ready:
 * - `control`: lifecycle state machine, pause gate and cancel flag
 * - `events`: bounded event queue with a dispatcher thread
 * - `statement`: completeness heuristics for line-by-line input
 * - `translator`: `StreamingTranslator` and the ingestion modes
 */

pub mod control;
pub mod events;
pub mod statement;
pub mod translator;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::StreamingProgress;

pub use control::SessionState;
pub use events::{EventListener, ListenerId, StreamingEvent, StreamingEventData};
pub use statement::{BalancedDelimiters, StatementDetector};
pub use translator::{StreamingTranslator, TranslationStream, UpdateCallback};

/// How a session groups its input before translating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingMode {
    /// Buffer lines until they form a complete statement
    LineByLine,
    /// Translate every top-level block once the next one begins
    #[default]
    BlockByBlock,
    /// Wait for the whole input, then run the chunk pipeline
    FullDocument,
    /// Treat each input unit as one conversational turn
    Interactive,
}

impl StreamingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LineByLine => "line_by_line",
            Self::BlockByBlock => "block_by_block",
            Self::FullDocument => "full_document",
            Self::Interactive => "interactive",
        }
    }
}

impl fmt::Display for StreamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incremental translation result reported to the update callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    /// Input unit (statement, block, chunk or turn) the block came from
    pub chunk_index: usize,

    /// Position of the block inside its unit
    pub block_index: usize,

    /// Text before translation
    pub original_content: String,

    /// Text after translation; `None` when translation failed
    pub translated_content: Option<String>,

    /// Whether more output for the same block will follow
    pub is_partial: bool,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Configuration for streaming sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bytes of recent code kept as translation context
    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,

    /// Capacity of the event queue; events beyond it are dropped
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Transcript entries kept as history in interactive mode
    #[serde(default = "default_transcript_turns")]
    pub transcript_turns: usize,

    /// Chunk size used by full-document mode
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context_window_size: default_context_window_size(),
            event_queue_capacity: default_event_queue_capacity(),
            transcript_turns: default_transcript_turns(),
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

fn default_context_window_size() -> usize {
    2048
}

fn default_event_queue_capacity() -> usize {
    1024
}

fn default_transcript_turns() -> usize {
    5
}

fn default_max_chunk_size() -> usize {
    2048
}

/// Final report of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,

    pub mode: StreamingMode,

    /// State the session ended in
    pub state: SessionState,

    /// Progress at the end of the session
    pub progress: StreamingProgress,

    /// Events dropped because the queue was full
    pub dropped_events: u64,
}
