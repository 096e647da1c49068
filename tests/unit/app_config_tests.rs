/*!
 * Tests for app configuration loading, saving and validation
 */

use anyhow::Result;
use pseudostream::app_config::{Config, LogLevel};
use pseudostream::buffer::EvictionPolicy;
use pseudostream::chunking::ChunkConfig;

use crate::common;

#[test]
fn test_config_save_thenFromFile_shouldRestoreValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("conf.json");

    let mut config = Config::default();
    config.chunking.max_chunk_size = 1024;
    config.streaming.max_concurrent_chunks = 6;
    config.buffer.eviction_policy = EvictionPolicy::Fifo;
    config.session.transcript_turns = 9;
    config.log_level = LogLevel::Trace;

    config.save(&path)?;
    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_config_from_file_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "streaming": { "max_concurrent_chunks": 1 }, "buffer": { "max_size_mb": 2 } }"#,
    )?;

    let config = Config::from_file(&path)?;
    assert!(!config.streaming.is_parallel());
    assert_eq!(config.buffer.capacity(), 2 * 1024 * 1024);
    assert_eq!(config.chunking, ChunkConfig::default());
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_config_from_file_withInvalidJson_shouldNamePath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
    Ok(())
}

#[test]
fn test_config_from_file_withMissingFile_shouldFail() {
    assert!(Config::from_file("/nonexistent/pseudostream/conf.json").is_err());
}

#[test]
fn test_config_validate_withMinAboveMax_shouldFail() {
    let mut config = Config::default();
    config.chunking.min_chunk_size = config.chunking.max_chunk_size + 1;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("min_chunk_size"));
}

#[test]
fn test_config_validate_withZeroSessionQueue_shouldFail() {
    let mut config = Config::default();
    config.session.event_queue_capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_default_path_shouldEndWithConfFile() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("pseudostream/conf.json"));
    }
}
