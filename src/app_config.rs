use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::buffer::BufferConfig;
use crate::chunking::ChunkConfig;
use crate::pipeline::StreamConfig;
use crate::session::SessionConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Chunking limits and strategy
    #[serde(default)]
    pub chunking: ChunkConfig,

    /// Pipeline scheduling
    #[serde(default)]
    pub streaming: StreamConfig,

    /// Result cache sizing
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Real-time session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pseudostream").join("conf.json"))
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Chunking limits
        let chunking = &self.chunking;
        if chunking.max_chunk_size == 0 {
            return Err(anyhow!("chunking.max_chunk_size must be greater than 0"));
        }
        if chunking.max_lines_per_chunk == 0 {
            return Err(anyhow!("chunking.max_lines_per_chunk must be greater than 0"));
        }
        if chunking.min_chunk_size > chunking.max_chunk_size {
            return Err(anyhow!(
                "chunking.min_chunk_size ({}) cannot exceed max_chunk_size ({})",
                chunking.min_chunk_size,
                chunking.max_chunk_size
            ));
        }
        if chunking.overlap_size >= chunking.max_chunk_size {
            return Err(anyhow!(
                "chunking.overlap_size ({}) must be smaller than max_chunk_size ({})",
                chunking.overlap_size,
                chunking.max_chunk_size
            ));
        }

        // Scheduling
        let streaming = &self.streaming;
        if streaming.max_concurrent_chunks == 0 {
            return Err(anyhow!("streaming.max_concurrent_chunks must be at least 1"));
        }
        if streaming.thread_pool_size == 0 {
            return Err(anyhow!("streaming.thread_pool_size must be at least 1"));
        }
        if streaming.chunk_timeout_ms == 0 {
            return Err(anyhow!("streaming.chunk_timeout_ms must be greater than 0"));
        }
        if streaming.max_queue_size == 0 {
            return Err(anyhow!("streaming.max_queue_size must be at least 1"));
        }
        if streaming.context_window_size == 0 {
            return Err(anyhow!("streaming.context_window_size must be greater than 0"));
        }

        if self.buffer.capacity() == 0 {
            return Err(anyhow!("buffer capacity must be greater than 0"));
        }

        let session = &self.session;
        if session.context_window_size == 0 || session.max_chunk_size == 0 {
            return Err(anyhow!("session sizes must be greater than 0"));
        }
        if session.event_queue_capacity == 0 {
            return Err(anyhow!("session.event_queue_capacity must be at least 1"));
        }
        if session.transcript_turns == 0 {
            return Err(anyhow!("session.transcript_turns must be at least 1"));
        }

        Ok(())
    }
}
