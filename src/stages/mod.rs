/*!
 * Contracts for the external parse, translate and assemble stages.
 *
 * The pipeline never interprets text itself. It relies on three collaborators:
 * - `BlockParser`: classifies text into typed blocks
 * - `CodeTranslator`: turns a natural-language instruction into code
 * - `CodeAssembler`: joins blocks into the final program text
 *
 * All three are synchronous and shareable across threads, so the same
 * implementation can be called inline or from a blocking worker.
 */

pub mod heuristic;
pub mod mock;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::TranslateError;

pub use heuristic::{ImportHoistingAssembler, LineClassifierParser};
pub use mock::{MockBehavior, MockTranslator};

/// Classification of a block of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Source code, passed through unchanged
    Code,
    /// Natural-language instruction to translate
    English,
    /// Comment, passed through unchanged
    Comment,
    /// Natural language interleaved with code, passed through unchanged
    Mixed,
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Code => "code",
            Self::English => "english",
            Self::Comment => "comment",
            Self::Mixed => "mixed",
        };
        write!(f, "{}", name)
    }
}

/// A classified span of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block classification
    pub kind: BlockType,

    /// Block text
    pub content: String,

    /// First and last line of the block (1-based, inclusive)
    pub line_numbers: (usize, usize),

    /// Free-form annotations
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Block {
    /// Create a block without metadata
    pub fn new(kind: BlockType, content: impl Into<String>, line_numbers: (usize, usize)) -> Self {
        Self {
            kind,
            content: content.into(),
            line_numbers,
            metadata: BTreeMap::new(),
        }
    }

    /// Whether the block must go through the translator
    pub fn needs_translation(&self) -> bool {
        self.kind == BlockType::English
    }

    /// Create the code block that replaces this block after translation
    pub fn translated(&self, code: String) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.insert("translated".to_string(), "true".to_string());
        Self {
            kind: BlockType::Code,
            content: code,
            line_numbers: self.line_numbers,
            metadata,
        }
    }
}

/// Result of parsing a span of text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Whether the text could be classified
    pub success: bool,

    /// Blocks in source order
    pub blocks: Vec<Block>,

    /// Diagnostics explaining a failure
    pub errors: Vec<String>,

    /// Non-fatal diagnostics
    pub warnings: Vec<String>,
}

/// Context handed to the translator with each instruction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationContext {
    /// Chunk the instruction belongs to
    pub chunk_index: Option<usize>,

    /// Recent code preceding the instruction
    pub code: String,

    /// Code immediately before the instruction
    pub before: String,

    /// Code immediately after the instruction, when known
    pub after: String,

    /// Ingestion mode name, for session translations
    pub mode: Option<String>,

    /// Recent conversational turns, for interactive sessions
    pub session_history: Vec<String>,

    /// Number of turns so far, for interactive sessions
    pub interaction_count: usize,

    /// Whether the request comes from a live session
    pub streaming: bool,
}

/// Classifies text into typed blocks
pub trait BlockParser: Send + Sync {
    /// Parse text into blocks
    ///
    /// Must not panic on malformed input; report it with `success = false`.
    fn parse(&self, text: &str) -> ParseOutcome;

    /// Split raw text into top-level blocks without classifying them
    fn identify_blocks(&self, text: &str) -> Vec<String>;
}

/// Turns natural-language instructions into code
pub trait CodeTranslator: Send + Sync {
    /// Translate one instruction
    fn translate(
        &self,
        instruction: &str,
        context: &TranslationContext,
    ) -> Result<String, TranslateError>;

    /// Prepare the translator before a session starts
    fn warm_up(&self) -> Result<(), TranslateError> {
        Ok(())
    }
}

/// Joins blocks into program text
pub trait CodeAssembler: Send + Sync {
    /// Assemble blocks in the given order; must be deterministic
    fn assemble(&self, blocks: &[Block]) -> String;
}

/// The three collaborators of a pipeline or session
#[derive(Clone)]
pub struct Stages {
    pub parser: Arc<dyn BlockParser>,
    pub translator: Arc<dyn CodeTranslator>,
    pub assembler: Arc<dyn CodeAssembler>,
}

impl Stages {
    /// Bundle explicit collaborators
    pub fn new(
        parser: Arc<dyn BlockParser>,
        translator: Arc<dyn CodeTranslator>,
        assembler: Arc<dyn CodeAssembler>,
    ) -> Self {
        Self {
            parser,
            translator,
            assembler,
        }
    }

    /// Use the reference parser and assembler around a translator
    pub fn with_translator(translator: Arc<dyn CodeTranslator>) -> Self {
        Self::new(
            Arc::new(LineClassifierParser::new()),
            translator,
            Arc::new(ImportHoistingAssembler),
        )
    }
}

impl std::fmt::Debug for Stages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stages").finish_non_exhaustive()
    }
}
