// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use pseudostream::app_config::{self, Config};
use pseudostream::chunking::{CodeChunker, validate_chunks};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how a source file would be chunked and check the round trip
    Chunk {
        /// Source file to chunk
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the maximum chunk size in bytes
        #[arg(long)]
        max_chunk_size: Option<usize>,

        /// Override the overlap between chunks in bytes
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Print the effective configuration, or write it to a file
    Config {
        /// Write the configuration to this path instead of printing it
        #[arg(short, long, value_name = "PATH")]
        write: Option<PathBuf>,
    },

    /// Generate shell completions for pseudostream
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// pseudostream - Streaming pseudocode translation
///
/// Splits large pseudocode documents into syntax-aware chunks and drives
/// them through a streaming translation pipeline.
#[derive(Parser, Debug)]
#[command(name = "pseudostream")]
#[command(version)]
#[command(about = "Streaming pseudocode translation pipeline")]
#[command(long_about = "pseudostream splits large pseudocode documents into syntax-aware chunks and \
translates them incrementally.

EXAMPLES:
    pseudostream chunk program.py                    # Show the chunk plan for a file
    pseudostream chunk --max-chunk-size 1024 big.py  # Plan with smaller chunks
    pseudostream config                              # Print the effective configuration
    pseudostream config --write conf.json            # Write the configuration to a file
    pseudostream completions bash > pseudostream.bash

CONFIGURATION:
    Configuration is read from --config-path when given, otherwise from the
    user configuration directory (pseudostream/conf.json) when it exists.
    Missing settings fall back to their defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pseudostream", &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { write } => {
            let config = load_config(cli.config_path.as_deref(), cli.log_level.as_ref())?;
            match write {
                Some(path) => {
                    config.save(&path)?;
                    info!("Configuration written to {}", path.display());
                }
                None => {
                    let json = serde_json::to_string_pretty(&config)
                        .context("Failed to serialize config to JSON")?;
                    println!("{}", json);
                }
            }
            Ok(())
        }
        Commands::Chunk {
            file,
            max_chunk_size,
            overlap,
        } => {
            let mut config = load_config(cli.config_path.as_deref(), cli.log_level.as_ref())?;
            if let Some(max) = max_chunk_size {
                config.chunking.max_chunk_size = max;
                config.chunking.min_chunk_size = config.chunking.min_chunk_size.min(max);
            }
            if let Some(overlap) = overlap {
                config.chunking.overlap_size = overlap;
            }
            config
                .validate()
                .context("Configuration validation failed")?;
            run_chunk(&config, &file)
        }
    }
}

/// Load the configuration from the given path, the default location or defaults
fn load_config(path: Option<&Path>, cli_log_level: Option<&CliLogLevel>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(default_path) => {
                debug!("Loading configuration from {}", default_path.display());
                Config::from_file(&default_path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Config::default()
            }
        },
    };

    // If log level was not set via command line, update it from config now
    if cli_log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }
    Ok(config)
}

fn run_chunk(config: &Config, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file: {}", file.display()))?;

    let chunker = CodeChunker::new(config.chunking.clone());
    let chunks = chunker.chunk(&text);
    if chunks.is_empty() {
        warn!("{} is empty, nothing to chunk", file.display());
        return Ok(());
    }

    let strategy = match &chunks[0].metadata {
        m if m.single_chunk => "single chunk".to_string(),
        m if m.ast_based => "syntax boundaries".to_string(),
        m => match &m.fallback_reason {
            Some(reason) => format!("lines (fallback: {})", reason),
            None => "lines".to_string(),
        },
    };
    println!(
        "{}: {} bytes, {} chunks, strategy: {}",
        file.display(),
        text.len(),
        chunks.len(),
        strategy
    );

    for chunk in &chunks {
        println!(
            "  #{:<4} lines {:>5}-{:<5} bytes {:>8}-{:<8} size {:>6} overlap {:>4} {}",
            chunk.index,
            chunk.start_line,
            chunk.end_line,
            chunk.start_byte,
            chunk.end_byte,
            chunk.size(),
            chunk.metadata.overlap_bytes,
            chunk.metadata.boundary_types.join(",")
        );
    }

    if !validate_chunks(&chunks, &text) {
        return Err(anyhow!("Chunk plan for {} does not reproduce the input", file.display()));
    }
    info!("Round trip verified for {} chunks", chunks.len());
    Ok(())
}
