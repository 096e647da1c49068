/*!
 * Integration tests for real-time translation sessions
 */

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use futures::StreamExt;
use parking_lot::Mutex;

use pseudostream::app_config::Config;
use pseudostream::errors::{StreamingError, TranslateError};
use pseudostream::session::{
    SessionState, StreamingEvent, StreamingEventData, StreamingMode, StreamingTranslator,
    TranslationUpdate,
};
use pseudostream::stages::{CodeTranslator, MockTranslator};

use crate::common;

type Recorded<T> = Arc<Mutex<Vec<T>>>;

fn translator_with(mock: Arc<dyn CodeTranslator>) -> StreamingTranslator {
    StreamingTranslator::new(&Config::default(), common::stages_with(mock))
}

fn working_translator() -> StreamingTranslator {
    translator_with(Arc::new(MockTranslator::working()))
}

/// Translator whose full-document runs always chunk, with small chunks
fn document_translator(mock: Arc<dyn CodeTranslator>) -> StreamingTranslator {
    document_translator_with_overlap(mock, 0)
}

fn document_translator_with_overlap(mock: Arc<dyn CodeTranslator>, overlap: usize) -> StreamingTranslator {
    let mut config = Config::default();
    config.session.max_chunk_size = 200;
    config.chunking.overlap_size = overlap;
    config.streaming.min_size_for_streaming = 0;
    StreamingTranslator::new(&config, common::stages_with(mock))
}

/// Translator with default chunking that streams every full document
fn default_chunking_translator(overlap: usize) -> StreamingTranslator {
    let mut config = Config::default();
    config.chunking.overlap_size = overlap;
    config.streaming.min_size_for_streaming = 0;
    StreamingTranslator::new(&config, common::working_stages())
}

fn full_document_output(translator: &StreamingTranslator, document: &str) -> String {
    translator
        .translate_stream(vec![document.to_string()], StreamingMode::FullDocument, None)
        .unwrap()
        .collect()
}

fn record_events(translator: &StreamingTranslator) -> Recorded<StreamingEventData> {
    let events: Recorded<StreamingEventData> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    translator.add_event_listener(Arc::new(move |event: &StreamingEventData| {
        sink.lock().push(event.clone());
    }));
    events
}

fn kinds(events: &Recorded<StreamingEventData>) -> Vec<StreamingEvent> {
    events.lock().iter().map(|e| e.event).collect()
}

#[test]
fn test_line_mode_withUpdates_shouldReportEveryBlock() {
    common::init_test_logging();
    let translator = working_translator();
    let updates: Recorded<TranslationUpdate> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    let lines = vec!["total = 0\n", "add one to the total\n", "show(total,\n", "     done)\n"];
    let mut stream = translator
        .translate_stream(
            lines,
            StreamingMode::LineByLine,
            Some(Arc::new(move |update: &TranslationUpdate| sink.lock().push(update.clone()))),
        )
        .unwrap();
    let output: Vec<String> = stream.by_ref().collect();
    let summary = stream.finish().unwrap();

    assert_eq!(
        output,
        vec![
            "total = 0\n".to_string(),
            "print(\"add one to the total\")\n".to_string(),
            "show(total,\n     done)\n".to_string(),
        ]
    );

    let updates = updates.lock();
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[1].chunk_index, 1);
    assert_eq!(updates[1].original_content, "add one to the total");
    assert_eq!(
        updates[1].translated_content.as_deref(),
        Some("print(\"add one to the total\")")
    );
    assert_eq!(updates[1].metadata.get("block_type").map(String::as_str), Some("english"));
    assert!(updates.iter().all(|u| !u.is_partial));

    assert_eq!(summary.state, SessionState::Completed);
    assert_eq!(summary.mode, StreamingMode::LineByLine);
    assert_eq!(summary.progress.processed_chunks, 3);
    assert_eq!(summary.session_id, translator.session_id());
}

#[test]
fn test_block_mode_shouldEmitBlocksOnceTheNextBegins() {
    let translator = working_translator();
    let inputs = vec!["x = 1\n", "\n", "compute the sum\n", "\n", "y = 2\n"];

    let output: String = translator
        .translate_stream(inputs, StreamingMode::BlockByBlock, None)
        .unwrap()
        .collect();

    assert_eq!(output, "x = 1\n\nprint(\"compute the sum\")\n\ny = 2\n");
    assert_eq!(translator.state(), SessionState::Completed);
}

#[test]
fn test_interactive_mode_shouldCarryTranscriptIntoContext() {
    let mock = Arc::new(MockTranslator::working());
    let translator = translator_with(mock.clone());

    let output: Vec<String> = translator
        .translate_stream(
            vec!["compute the sum", "   ", "double the total"],
            StreamingMode::Interactive,
            None,
        )
        .unwrap()
        .collect();

    assert_eq!(
        output,
        vec![
            "# Translation 0:\nprint(\"compute the sum\")\n\n".to_string(),
            "# Translation 1:\nprint(\"double the total\")\n\n".to_string(),
        ]
    );

    let context = mock.last_context().expect("translator was called");
    assert_eq!(context.mode.as_deref(), Some("interactive"));
    assert_eq!(context.interaction_count, 1);
    assert_eq!(
        context.session_history,
        vec![
            "# User input 0:\ncompute the sum".to_string(),
            "# Translation 0:\nprint(\"compute the sum\")".to_string(),
            "# User input 1:\ndouble the total".to_string(),
        ]
    );
    assert!(context.streaming);
}

#[test]
fn test_full_document_withPause_shouldMatchUnpausedOutput() {
    common::init_test_logging();
    let document = common::pseudocode_document(10);
    let lines: Vec<String> = document.split_inclusive('\n').map(str::to_string).collect();

    let baseline_translator = document_translator(Arc::new(MockTranslator::working()));
    let baseline: Vec<String> = baseline_translator
        .translate_stream(lines.clone(), StreamingMode::FullDocument, None)
        .unwrap()
        .collect();
    assert!(baseline.len() > 2, "document should span several chunks");

    let translator = document_translator(Arc::new(MockTranslator::working()));
    let events = record_events(&translator);
    let mut stream = translator
        .translate_stream(lines, StreamingMode::FullDocument, None)
        .unwrap();

    let mut output = vec![stream.next().expect("first chunk")];
    assert!(translator.pause());
    assert_eq!(translator.state(), SessionState::Paused);

    let resumer = translator.clone();
    let paused_at = Instant::now();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        resumer.resume()
    });
    output.push(stream.next().expect("second chunk"));
    assert!(paused_at.elapsed() >= Duration::from_millis(150));
    assert!(handle.join().unwrap());

    output.extend(stream.by_ref());
    let summary = stream.finish().unwrap();

    assert_eq!(output, baseline);
    assert_eq!(summary.state, SessionState::Completed);
    assert!(summary.progress.is_complete());

    let kinds = kinds(&events);
    let started = kinds.iter().filter(|k| **k == StreamingEvent::ChunkStarted).count();
    let completed = kinds.iter().filter(|k| **k == StreamingEvent::ChunkCompleted).count();
    assert_eq!(started, baseline.len());
    assert_eq!(completed, baseline.len());
}

#[test]
fn test_full_document_output_shouldTranslateEverySection() {
    let translator = document_translator(Arc::new(MockTranslator::working()));
    let document = common::pseudocode_document(5);

    let output: String = translator
        .translate_stream(vec![document], StreamingMode::FullDocument, None)
        .unwrap()
        .collect();

    for i in 0..5 {
        assert!(output.contains(&format!("def step_{}(values):", i)));
        assert!(output.contains(&format!("print(\"add every value to total number {}\")", i)));
    }
}

#[test]
fn test_full_document_withOverlap_shouldNotRepeatOverlappedLines() {
    let document = common::pseudocode_document(8);
    let with_overlap = full_document_output(
        &document_translator_with_overlap(Arc::new(MockTranslator::working()), 64),
        &document,
    );
    let without_overlap = full_document_output(
        &document_translator(Arc::new(MockTranslator::working())),
        &document,
    );

    for i in 0..8 {
        assert_eq!(with_overlap.matches(&format!("def step_{}(values):", i)).count(), 1);
    }
    assert_eq!(
        common::content_lines(&with_overlap),
        common::content_lines(&without_overlap)
    );
}

#[test]
fn test_full_document_withDefaultChunking_shouldKeepBracketedCodeIntact() {
    let document = common::bracketed_document(60);
    let translator = default_chunking_translator(Config::default().chunking.overlap_size);
    let events = record_events(&translator);

    let with_overlap = full_document_output(&translator, &document);
    let without_overlap = full_document_output(&default_chunking_translator(0), &document);

    assert!(!kinds(&events).contains(&StreamingEvent::Error));
    assert_eq!(translator.state(), SessionState::Completed);
    assert!(translator.pipeline().progress().total_chunks > 2);
    for i in 0..60 {
        let call = format!("value_{:04} = compute_total(", i);
        assert_eq!(with_overlap.matches(&call).count(), 1, "{}", call);
    }
    assert_eq!(
        common::content_lines(&with_overlap),
        common::content_lines(&without_overlap)
    );
}

#[test]
fn test_session_events_shouldStartAndCompleteInOrder() {
    let translator = working_translator();
    let events = record_events(&translator);

    let stream = translator
        .translate_stream(vec!["x = 1\n", "say hello\n"], StreamingMode::LineByLine, None)
        .unwrap();
    let output: Vec<String> = stream.collect();
    assert_eq!(output.len(), 2);

    let events = events.lock();
    assert_eq!(events.first().map(|e| e.event), Some(StreamingEvent::Started));
    assert_eq!(events.last().map(|e| e.event), Some(StreamingEvent::Completed));
    assert_eq!(
        events[0].data.as_ref().and_then(|d| d.get("mode")).and_then(|m| m.as_str()),
        Some("line_by_line")
    );
    assert!(events.iter().all(|e| e.session_id == translator.session_id()));
    assert!(events
        .iter()
        .any(|e| e.event == StreamingEvent::TranslationCompleted && e.chunk_index == Some(1)));
    let updates = events
        .iter()
        .filter(|e| e.event == StreamingEvent::ProgressUpdate)
        .count();
    assert_eq!(updates, 2);
}

#[test]
fn test_session_events_withPanickingListener_shouldReachOtherListeners() {
    let translator = working_translator();
    translator.add_event_listener(Arc::new(|_: &StreamingEventData| panic!("listener failure")));
    let events = record_events(&translator);

    let summary = {
        let mut stream = translator
            .translate_stream(vec!["x = 1\n"], StreamingMode::LineByLine, None)
            .unwrap();
        assert_eq!(stream.next().as_deref(), Some("x = 1\n"));
        assert!(stream.next().is_none());
        stream.finish().unwrap()
    };

    assert_eq!(summary.state, SessionState::Completed);
    assert_eq!(kinds(&events).last(), Some(&StreamingEvent::Completed));
}

#[test]
fn test_remove_event_listener_shouldStopDelivery() {
    let translator = working_translator();
    let events: Recorded<StreamingEventData> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let id = translator.add_event_listener(Arc::new(move |event: &StreamingEventData| {
        sink.lock().push(event.clone());
    }));

    assert!(translator.remove_event_listener(id));
    assert!(!translator.remove_event_listener(id));
    let _ = translator
        .translate_stream(vec!["x = 1\n"], StreamingMode::LineByLine, None)
        .unwrap()
        .count();

    assert!(events.lock().is_empty());
}

#[test]
fn test_cancel_midSession_shouldEndCancelled() {
    let translator = working_translator();
    let events = record_events(&translator);
    let lines: Vec<String> = (0..50).map(|i| format!("value_{} = {}\n", i, i)).collect();

    let mut stream = translator
        .translate_stream(lines, StreamingMode::LineByLine, None)
        .unwrap();
    assert_eq!(stream.next().as_deref(), Some("value_0 = 0\n"));

    translator.cancel();
    assert!(translator.is_cancelled());
    assert!(stream.next().is_none());
    let summary = stream.finish().unwrap();

    assert_eq!(summary.state, SessionState::Cancelled);
    assert!(summary.progress.processed_chunks < 50);
    let kinds = kinds(&events);
    assert!(kinds.contains(&StreamingEvent::Cancelled));
    assert!(!kinds.contains(&StreamingEvent::Completed));
}

#[test]
fn test_cancel_whilePaused_shouldReleaseConsumer() {
    let translator = working_translator();
    let lines: Vec<String> = (0..10).map(|i| format!("v{} = {}\n", i, i)).collect();
    let mut stream = translator
        .translate_stream(lines, StreamingMode::LineByLine, None)
        .unwrap();
    assert!(stream.next().is_some());
    assert!(translator.pause());

    let canceller = translator.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        canceller.cancel();
    });
    assert!(stream.next().is_none());
    handle.join().unwrap();

    assert_eq!(stream.finish().unwrap().state, SessionState::Cancelled);
}

#[test]
fn test_translation_failure_shouldPassOriginalThroughWithWarning() {
    let translator = translator_with(Arc::new(MockTranslator::failing_on("explode")));
    let events = record_events(&translator);
    let updates: Recorded<TranslationUpdate> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    let mut stream = translator
        .translate_stream(
            vec!["x = 1\n", "explode the stack\n", "say hello\n"],
            StreamingMode::LineByLine,
            Some(Arc::new(move |update: &TranslationUpdate| sink.lock().push(update.clone()))),
        )
        .unwrap();
    let output: Vec<String> = stream.by_ref().collect();
    let summary = stream.finish().unwrap();

    assert_eq!(
        output,
        vec![
            "x = 1\n".to_string(),
            "explode the stack\n".to_string(),
            "print(\"say hello\")\n".to_string(),
        ]
    );
    assert_eq!(summary.state, SessionState::Completed);
    assert_eq!(summary.progress.warnings.len(), 1);

    let updates = updates.lock();
    let failed = &updates[1];
    assert_eq!(failed.translated_content, None);
    assert_eq!(
        failed.metadata.get("translation_failed").map(String::as_str),
        Some("true")
    );

    let events = events.lock();
    let warning = events
        .iter()
        .find(|e| e.event == StreamingEvent::Warning)
        .expect("warning event");
    assert_eq!(warning.chunk_index, Some(1));
    assert!(warning.warning.as_deref().is_some_and(|w| w.contains("explode the stack")));
}

#[test]
fn test_parse_failure_shouldReportErrorAndContinue() {
    let translator = working_translator();
    let events = record_events(&translator);

    let output: Vec<String> = translator
        .translate_stream(
            vec!["x = 1\n", "\n", "values = compute(1, 2))\n", "\n", "y = 2\n"],
            StreamingMode::BlockByBlock,
            None,
        )
        .unwrap()
        .collect();

    assert_eq!(output, vec!["x = 1\n\n".to_string(), "y = 2\n".to_string()]);
    let events = events.lock();
    let error = events
        .iter()
        .find(|e| e.event == StreamingEvent::Error)
        .expect("error event");
    assert!(error.error.as_deref().is_some_and(|e| e.starts_with("Unit 1: Parse error")));
    assert_eq!(events.last().map(|e| e.event), Some(StreamingEvent::Completed));
}

#[test]
fn test_setup_failure_shouldPublishStartedThenError() {
    let translator = translator_with(Arc::new(MockTranslator::unavailable()));
    let events = record_events(&translator);

    let err = translator
        .translate_stream(vec!["x = 1\n"], StreamingMode::LineByLine, None)
        .err()
        .expect("setup should fail");

    assert!(matches!(err, StreamingError::Translator(TranslateError::Unavailable(_))));
    assert_eq!(translator.state(), SessionState::Error);
    assert_eq!(kinds(&events), vec![StreamingEvent::Started, StreamingEvent::Error]);
}

#[test]
fn test_translator_reuse_afterCompletion_shouldStartNewSession() {
    let translator = working_translator();
    let _ = translator
        .translate_stream(vec!["x = 1\n"], StreamingMode::LineByLine, None)
        .unwrap()
        .count();
    let first_id = translator.session_id();

    let output: Vec<String> = translator
        .translate_stream(vec!["say hi\n"], StreamingMode::LineByLine, None)
        .unwrap()
        .collect();

    assert_eq!(output, vec!["print(\"say hi\")\n".to_string()]);
    assert_ne!(translator.session_id(), first_id);
    assert_eq!(translator.state(), SessionState::Completed);
}

#[tokio::test]
async fn test_translate_stream_async_shouldMatchSyncOutput() {
    let inputs = vec!["x = 1\n", "\n", "compute the sum\n", "\n", "y = 2\n"];

    let sync_output: Vec<String> = working_translator()
        .translate_stream(inputs.clone(), StreamingMode::BlockByBlock, None)
        .unwrap()
        .collect();

    let translator = working_translator();
    let async_output: Vec<String> = translator
        .translate_stream_async(futures::stream::iter(inputs), StreamingMode::BlockByBlock, None)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(async_output, sync_output);
    assert_eq!(translator.state(), SessionState::Completed);
}

#[tokio::test]
async fn test_translate_stream_async_cancel_shouldEndStream() {
    let translator = working_translator();
    let (sender, receiver) = tokio::sync::mpsc::channel::<String>(4);
    let input = tokio_stream_from(receiver);

    let mut stream = translator
        .translate_stream_async(input, StreamingMode::Interactive, None)
        .await
        .unwrap();

    sender.send("compute the sum".to_string()).await.unwrap();
    let first = stream.next().await.expect("first turn");
    assert!(first.starts_with("# Translation 0:"));

    // The session is now waiting for input that never arrives
    translator.cancel();
    assert!(tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("stream should end after cancel")
        .is_none());
    assert_eq!(translator.state(), SessionState::Cancelled);
    drop(sender);
}

/// Adapt a tokio receiver into a `Stream`
fn tokio_stream_from(
    receiver: tokio::sync::mpsc::Receiver<String>,
) -> futures::stream::BoxStream<'static, String> {
    futures::stream::unfold(receiver, |mut receiver| async move {
        let item = receiver.recv().await?;
        Some((item, receiver))
    })
    .boxed()
}
