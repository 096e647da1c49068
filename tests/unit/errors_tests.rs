/*!
 * Tests for error messages and conversions
 */

use pseudostream::errors::{AppError, CacheError, StreamingError, TranslateError};
use pseudostream::session::SessionState;

#[test]
fn test_translate_error_display_shouldDescribeCause() {
    assert_eq!(
        TranslateError::Failed("no output".to_string()).to_string(),
        "Translation failed: no output"
    );
    assert_eq!(
        TranslateError::Timeout(250).to_string(),
        "Translation timed out after 250 ms"
    );
}

#[test]
fn test_streaming_error_display_shouldNameStates() {
    let running = StreamingError::AlreadyRunning(SessionState::Processing);
    assert_eq!(
        running.to_string(),
        "A streaming session is already running (state: processing)"
    );

    let transition = StreamingError::InvalidTransition {
        from: SessionState::Completed,
        to: SessionState::Paused,
    };
    assert_eq!(
        transition.to_string(),
        "Invalid session transition from completed to paused"
    );
}

#[test]
fn test_streaming_error_fromTranslateError_shouldWrap() {
    let err: StreamingError = TranslateError::Unavailable("offline".to_string()).into();
    assert!(matches!(err, StreamingError::Translator(TranslateError::Unavailable(_))));
    assert_eq!(err.to_string(), "Translator error: Translator unavailable: offline");
}

#[test]
fn test_app_error_conversions_shouldPickVariant() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let streaming = AppError::from(StreamingError::Setup("worker".to_string()));
    assert_eq!(
        streaming.to_string(),
        "Streaming error: Streaming setup failed: worker"
    );

    let cache = AppError::from(CacheError::Compression("zlib".to_string()));
    assert!(matches!(cache, AppError::Cache(_)));

    let other = AppError::from(anyhow::anyhow!("boom"));
    assert_eq!(other.to_string(), "Unknown error: boom");
}
