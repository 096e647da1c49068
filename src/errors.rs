/*!
 * Error types for the pseudostream library.
 *
 * This module contains custom error types for the different layers of the
 * streaming pipeline, using the thiserror crate for ergonomic error definitions.
 *
 * Chunk-level and block-level failures are never raised as errors: they are
 * carried as values on `ChunkResult` and as warnings. Only session-level
 * failures surface as `StreamingError`.
 */

use thiserror::Error;

use crate::session::SessionState;

/// Errors returned by a code translator collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// The translator produced no usable output for an instruction
    #[error("Translation failed: {0}")]
    Failed(String),

    /// The translator backend cannot be reached or initialized
    #[error("Translator unavailable: {0}")]
    Unavailable(String),

    /// The translator gave up waiting for its backend
    #[error("Translation timed out after {0} ms")]
    Timeout(u64),
}

/// Errors that can occur while encoding or decoding cached entries
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error when a value cannot be serialized for storage
    #[error("Failed to serialize cache entry: {0}")]
    Serialization(String),

    /// Error when compressing a serialized entry
    #[error("Failed to compress cache entry: {0}")]
    Compression(String),

    /// Error when a stored entry cannot be restored
    #[error("Failed to decode cache entry: {0}")]
    Decompression(String),
}

/// Session-level errors surfaced to the caller of a streaming session
#[derive(Error, Debug)]
pub enum StreamingError {
    /// Failure while starting a session (translator warm-up, worker start)
    #[error("Streaming setup failed: {0}")]
    Setup(String),

    /// Failure while tearing a session down
    #[error("Streaming teardown failed: {0}")]
    Teardown(String),

    /// A session is already active on this translator
    #[error("A streaming session is already running (state: {0})")]
    AlreadyRunning(SessionState),

    /// A state change that the session state machine does not allow
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition {
        /// State the session was in
        from: SessionState,
        /// State that was requested
        to: SessionState,
    },

    /// Error from the translator collaborator during setup
    #[error("Translator error: {0}")]
    Translator(#[from] TranslateError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a streaming session
    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamingError),

    /// Error from the result cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
