/*!
 * Streaming translator sessions.
 *
 * `StreamingTranslator` turns an incremental input source into translated
 * text. Every session runs the same per-unit processing whatever the caller:
 * `translate_stream` drives it inline from an `Iterator`, while
 * `translate_stream_async` moves each unit onto the blocking pool and awaits
 * it, so both variants produce identical output and events.
 *
 * Translation failures never end a session. A block that cannot be
 * translated is emitted unchanged with a `Warning` event, and a unit that
 * cannot be parsed is reported with an `Error` event and skipped.
 */

use std::collections::VecDeque;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use uuid::Uuid;

use super::control::{SessionControl, SessionState};
use super::events::{EventBus, EventListener, ListenerId, StreamingEvent, StreamingEventData};
use super::statement::{BalancedDelimiters, StatementDetector};
use super::{SessionConfig, SessionSummary, StreamingMode, TranslationUpdate};
use crate::app_config::Config;
use crate::buffer::ContextWindow;
use crate::chunking::ChunkConfig;
use crate::errors::{StreamingError, TranslateError};
use crate::pipeline::{ChunkResult, SequentialRun, StreamingPipeline, StreamingProgress};
use crate::stages::{Block, BlockType, ParseOutcome, Stages, TranslationContext};

/// Callback receiving per-block translation updates
pub type UpdateCallback = Arc<dyn Fn(&TranslationUpdate) + Send + Sync>;

/// State shared by a translator handle and its running session
struct SessionCore {
    config: SessionConfig,
    stages: Stages,
    pipeline: StreamingPipeline,
    control: SessionControl,
    events: EventBus,
    session_id: Mutex<Uuid>,
    context: Mutex<ContextWindow>,
    progress: Mutex<StreamingProgress>,
    detector: RwLock<Arc<dyn StatementDetector>>,
}

impl SessionCore {
    fn event(&self, kind: StreamingEvent) -> StreamingEventData {
        StreamingEventData::new(kind, *self.session_id.lock())
    }

    fn publish(&self, event: StreamingEventData) {
        self.events.emit(event);
    }

    fn progress_snapshot(&self) -> StreamingProgress {
        self.progress.lock().clone()
    }

    /// Idle or finished -> Started
    fn setup(&self, mode: StreamingMode) -> Result<(), StreamingError> {
        self.control.begin()?;
        let session_id = Uuid::new_v4();
        *self.session_id.lock() = session_id;
        *self.progress.lock() = StreamingProgress::default();
        self.context.lock().clear();

        if let Err(e) = self.events.start() {
            self.control.fail();
            return Err(StreamingError::Setup(format!(
                "cannot start event dispatcher: {}",
                e
            )));
        }
        self.publish(self.event(StreamingEvent::Started).with_data(json!({ "mode": mode })));

        let warm_up = catch_unwind(AssertUnwindSafe(|| self.stages.translator.warm_up()))
            .unwrap_or_else(|_| {
                Err(TranslateError::Unavailable(
                    "translator panicked during warm-up".to_string(),
                ))
            });
        if let Err(e) = warm_up {
            error!("Session {} setup failed: {}", session_id, e);
            self.publish(self.event(StreamingEvent::Error).with_error(e.to_string()));
            self.control.fail();
            if let Err(stop_error) = self.events.stop() {
                error!("{}", stop_error);
            }
            return Err(StreamingError::Translator(e));
        }

        info!("Streaming session {} started in {} mode", session_id, mode);
        Ok(())
    }

    /// End the session and stop its dispatcher
    fn teardown(
        &self,
        mode: StreamingMode,
        input_exhausted: bool,
    ) -> Result<SessionSummary, StreamingError> {
        if !input_exhausted && !self.control.is_cancelled() {
            info!("Session released before its input was exhausted");
            self.cancel();
        }

        let progress = self.progress_snapshot();
        if !self.control.is_cancelled() {
            match self.control.complete() {
                Ok(_) => self.publish(
                    self.event(StreamingEvent::Completed)
                        .with_progress(progress.clone()),
                ),
                Err(e) => warn!("Session could not complete: {}", e),
            }
        }

        let stopped = self.events.stop();
        let dropped_events = self.events.dropped_events();
        if let Err(e) = stopped {
            self.control.fail();
            return Err(StreamingError::Teardown(e));
        }
        if dropped_events > 0 {
            warn!("{} session events were dropped", dropped_events);
        }

        let summary = SessionSummary {
            session_id: *self.session_id.lock(),
            mode,
            state: self.control.state(),
            progress,
            dropped_events,
        };
        debug!("Session {} ended as {}", summary.session_id, summary.state);
        Ok(summary)
    }

    fn cancel(&self) {
        if self.control.cancel() {
            self.pipeline.cancel();
            self.publish(
                self.event(StreamingEvent::Cancelled)
                    .with_progress(self.progress_snapshot()),
            );
        }
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        catch_unwind(AssertUnwindSafe(|| self.stages.parser.parse(text))).unwrap_or_else(|_| {
            ParseOutcome {
                success: false,
                errors: vec!["parser panicked".to_string()],
                ..Default::default()
            }
        })
    }

    fn identify_blocks(&self, text: &str) -> Vec<String> {
        catch_unwind(AssertUnwindSafe(|| self.stages.parser.identify_blocks(text)))
            .unwrap_or_else(|_| {
                error!("Parser panicked while identifying blocks");
                vec![text.to_string()]
            })
    }

    fn unit_context(&self, unit: usize, mode: StreamingMode) -> TranslationContext {
        let code = self.context.lock().get_context();
        TranslationContext {
            chunk_index: Some(unit),
            before: code.clone(),
            code,
            mode: Some(mode.to_string()),
            streaming: true,
            ..Default::default()
        }
    }

    /// Translate one block, keeping the original text when translation fails
    fn render_block(
        &self,
        block: &Block,
        unit: usize,
        block_index: usize,
        context: &TranslationContext,
    ) -> (String, TranslationUpdate) {
        self.publish(
            self.event(StreamingEvent::TranslationStarted)
                .with_chunk(unit)
                .with_data(json!({ "block_type": block.kind, "block_index": block_index })),
        );

        let mut update = TranslationUpdate {
            chunk_index: unit,
            block_index,
            original_content: block.content.clone(),
            translated_content: None,
            is_partial: false,
            metadata: [("block_type".to_string(), block.kind.to_string())].into(),
        };

        match block.kind {
            BlockType::English => {
                let attempt = catch_unwind(AssertUnwindSafe(|| {
                    self.stages.translator.translate(&block.content, context)
                }))
                .unwrap_or_else(|_| Err(TranslateError::Failed("translator panicked".to_string())));
                match attempt {
                    Ok(code) => {
                        self.context.lock().add_context(&code);
                        self.publish(
                            self.event(StreamingEvent::TranslationCompleted)
                                .with_chunk(unit)
                                .with_data(json!({ "block_index": block_index })),
                        );
                        update.translated_content = Some(code.clone());
                        (code, update)
                    }
                    Err(e) => {
                        let message = format!(
                            "Translation error in unit {} block {}: {}",
                            unit, block_index, e
                        );
                        warn!("{}", message);
                        self.progress.lock().warnings.push(message.clone());
                        self.publish(
                            self.event(StreamingEvent::Warning)
                                .with_chunk(unit)
                                .with_warning(message),
                        );
                        update
                            .metadata
                            .insert("translation_failed".to_string(), "true".to_string());
                        (block.content.clone(), update)
                    }
                }
            }
            BlockType::Code => {
                self.context.lock().add_context(&block.content);
                update.translated_content = Some(block.content.clone());
                (block.content.clone(), update)
            }
            BlockType::Comment | BlockType::Mixed => {
                update.translated_content = Some(block.content.clone());
                (block.content.clone(), update)
            }
        }
    }

    /// Record a finished input unit and publish the new progress
    fn finish_unit(&self, unit: usize, bytes: usize, error: Option<String>) {
        let snapshot = {
            let mut progress = self.progress.lock();
            progress.total_chunks += 1;
            progress.processed_chunks += 1;
            progress.total_bytes += bytes;
            progress.bytes_processed += bytes;
            progress.current_chunk = Some(unit);
            progress.errors.extend(error);
            progress.clone()
        };
        self.publish(
            self.event(StreamingEvent::ProgressUpdate)
                .with_chunk(unit)
                .with_progress(snapshot),
        );
    }

    /// Parse and translate one statement or block
    fn process_unit(
        &self,
        text: &str,
        unit: usize,
        mode: StreamingMode,
        separator: &str,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) {
        let outcome = self.parse(text);
        if !outcome.success {
            let message = format!("Unit {}: Parse error: {}", unit, outcome.errors.join("; "));
            warn!("{}", message);
            self.publish(
                self.event(StreamingEvent::Error)
                    .with_chunk(unit)
                    .with_error(message.clone()),
            );
            self.finish_unit(unit, text.len(), Some(message));
            return;
        }

        for (block_index, block) in outcome.blocks.iter().enumerate() {
            let context = self.unit_context(unit, mode);
            let (rendered, update) = self.render_block(block, unit, block_index, &context);
            notify_update(on_update, &update);
            out.push_back(format!("{}{}", rendered, separator));
        }
        self.finish_unit(unit, text.len(), None);
    }

    /// Answer one interactive turn
    fn process_turn(
        &self,
        input: &str,
        turn: usize,
        transcript: &mut VecDeque<String>,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) {
        push_bounded(
            transcript,
            format!("# User input {}:\n{}", turn, input),
            self.config.transcript_turns,
        );

        let outcome = self.parse(input);
        if !outcome.success {
            let message = outcome.errors.join("; ");
            warn!("Interactive turn {} could not be parsed: {}", turn, message);
            self.publish(
                self.event(StreamingEvent::Error)
                    .with_chunk(turn)
                    .with_error(message.clone()),
            );
            out.push_back(format!("# Error: Failed to translate - {}\n\n", message));
            self.finish_unit(turn, input.len(), Some(format!("Turn {}: {}", turn, message)));
            return;
        }

        let context = TranslationContext {
            chunk_index: Some(turn),
            code: self.context.lock().get_context(),
            mode: Some(StreamingMode::Interactive.to_string()),
            session_history: transcript.iter().cloned().collect(),
            interaction_count: turn,
            streaming: true,
            ..Default::default()
        };

        let mut response = Vec::with_capacity(outcome.blocks.len());
        for (block_index, block) in outcome.blocks.iter().enumerate() {
            let (rendered, mut update) = self.render_block(block, turn, block_index, &context);
            update.original_content = input.to_string();
            update
                .metadata
                .insert("interactive".to_string(), "true".to_string());
            notify_update(on_update, &update);
            response.push(rendered);
        }

        let response = response.join("\n");
        push_bounded(
            transcript,
            format!("# Translation {}:\n{}", turn, response),
            self.config.transcript_turns,
        );
        out.push_back(format!("# Translation {}:\n{}\n\n", turn, response));
        self.finish_unit(turn, input.len(), None);
    }

    /// Process the next chunk of a full-document run; false when it is done
    fn document_step(
        &self,
        run: &mut SequentialRun,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) -> bool {
        if run.remaining() == 0 {
            // Lets the run stop its progress reporter
            let _ = run.next();
            return false;
        }

        let index = run.total_chunks() - run.remaining();
        self.publish(
            self.event(StreamingEvent::ChunkStarted)
                .with_chunk(index)
                .with_progress(self.progress_snapshot()),
        );
        let Some(result) = run.next() else {
            return false;
        };

        let snapshot = self.pipeline.progress();
        *self.progress.lock() = snapshot.clone();
        self.emit_chunk_result(&result, on_update, out);

        self.publish(
            self.event(StreamingEvent::ChunkCompleted)
                .with_chunk(result.index)
                .with_data(json!({
                    "success": result.success,
                    "processing_time_ms": result.processing_time_ms,
                })),
        );
        self.publish(
            self.event(StreamingEvent::ProgressUpdate)
                .with_chunk(result.index)
                .with_progress(snapshot),
        );
        true
    }

    fn emit_chunk_result(
        &self,
        result: &ChunkResult,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) {
        if let Some(error) = &result.error {
            self.publish(
                self.event(StreamingEvent::Error)
                    .with_chunk(result.index)
                    .with_error(error.clone()),
            );
            return;
        }
        for warning in &result.warnings {
            self.publish(
                self.event(StreamingEvent::Warning)
                    .with_chunk(result.index)
                    .with_warning(warning.clone()),
            );
        }

        let parsed = result.parsed_blocks.as_deref().unwrap_or(&[]);
        let mut rendered = Vec::with_capacity(result.blocks().len());
        for (block_index, block) in result.blocks().iter().enumerate() {
            let original = parsed.get(block_index).unwrap_or(block);
            let failed = block.metadata.contains_key("translation_failed");
            if block.metadata.contains_key("translated") {
                self.publish(
                    self.event(StreamingEvent::TranslationCompleted)
                        .with_chunk(result.index)
                        .with_data(json!({ "block_index": block_index })),
                );
            }
            if block.kind == BlockType::Code {
                self.context.lock().add_context(&block.content);
            }

            let mut update = TranslationUpdate {
                chunk_index: result.index,
                block_index,
                original_content: original.content.clone(),
                translated_content: (!failed).then(|| block.content.clone()),
                is_partial: false,
                metadata: [("block_type".to_string(), original.kind.to_string())].into(),
            };
            if failed {
                update
                    .metadata
                    .insert("translation_failed".to_string(), "true".to_string());
            }
            notify_update(on_update, &update);
            rendered.push(block.content.as_str());
        }

        if !rendered.is_empty() {
            out.push_back(format!("{}\n\n", rendered.join("\n\n")));
        }
    }
}

fn notify_update(on_update: Option<&UpdateCallback>, update: &TranslationUpdate) {
    if let Some(callback) = on_update {
        if catch_unwind(AssertUnwindSafe(|| callback(update))).is_err() {
            error!(
                "Update callback panicked on unit {} block {}",
                update.chunk_index, update.block_index
            );
        }
    }
}

fn push_bounded(entries: &mut VecDeque<String>, entry: String, limit: usize) {
    entries.push_back(entry);
    while entries.len() > limit.max(1) {
        entries.pop_front();
    }
}

/// What the driver does next
enum Step {
    Feed(String),
    EndOfInput,
    Advance,
}

/// Per-mode ingestion state
enum Ingest {
    Line { buffer: String, units: usize },
    Block { buffer: String, units: usize },
    Document { text: String, run: Option<SequentialRun> },
    Interactive { transcript: VecDeque<String>, turns: usize },
}

impl Ingest {
    fn new(mode: StreamingMode) -> Self {
        match mode {
            StreamingMode::LineByLine => Self::Line {
                buffer: String::new(),
                units: 0,
            },
            StreamingMode::BlockByBlock => Self::Block {
                buffer: String::new(),
                units: 0,
            },
            StreamingMode::FullDocument => Self::Document {
                text: String::new(),
                run: None,
            },
            StreamingMode::Interactive => Self::Interactive {
                transcript: VecDeque::new(),
                turns: 0,
            },
        }
    }

    /// Apply one step; returns false when the session has nothing more to do
    fn apply(
        &mut self,
        core: &SessionCore,
        step: Step,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) -> bool {
        match step {
            Step::Feed(unit) => {
                self.feed(core, unit, on_update, out);
                true
            }
            Step::EndOfInput => {
                self.end_of_input(core, on_update, out);
                true
            }
            Step::Advance => match self {
                Self::Document { run: Some(run), .. } => core.document_step(run, on_update, out),
                _ => false,
            },
        }
    }

    fn feed(
        &mut self,
        core: &SessionCore,
        unit: String,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) {
        match self {
            Self::Line { buffer, units } => {
                buffer.push_str(&unit);
                if !unit.ends_with('\n') {
                    buffer.push('\n');
                }
                let complete = core.detector.read().is_complete(buffer);
                if complete {
                    let statement = mem::take(buffer);
                    core.process_unit(&statement, *units, StreamingMode::LineByLine, "\n", on_update, out);
                    *units += 1;
                }
            }
            Self::Block { buffer, units } => {
                buffer.push_str(&unit);
                let blocks = core.identify_blocks(buffer);
                let Some((last, complete)) = blocks.split_last() else {
                    return;
                };
                if complete.is_empty() {
                    return;
                }
                for text in complete.iter().filter(|b| !b.trim().is_empty()) {
                    core.process_unit(text, *units, StreamingMode::BlockByBlock, "\n\n", on_update, out);
                    *units += 1;
                }
                // Keep the raw tail so the next input continues the last block
                *buffer = match buffer.rfind(last.as_str()) {
                    Some(position) => buffer.split_off(position),
                    None => format!("{}\n", last),
                };
            }
            Self::Document { text, .. } => text.push_str(&unit),
            Self::Interactive { transcript, turns } => {
                if unit.trim().is_empty() {
                    return;
                }
                let turn = *turns;
                *turns += 1;
                core.process_turn(&unit, turn, transcript, on_update, out);
            }
        }
    }

    fn end_of_input(
        &mut self,
        core: &SessionCore,
        on_update: Option<&UpdateCallback>,
        out: &mut VecDeque<String>,
    ) {
        match self {
            Self::Line { buffer, units } => {
                if !buffer.trim().is_empty() {
                    let statement = mem::take(buffer);
                    core.process_unit(&statement, *units, StreamingMode::LineByLine, "\n", on_update, out);
                    *units += 1;
                }
            }
            Self::Block { buffer, units } => {
                if !buffer.trim().is_empty() {
                    let remainder = mem::take(buffer);
                    core.process_unit(&remainder, *units, StreamingMode::BlockByBlock, "\n", on_update, out);
                    *units += 1;
                }
            }
            Self::Document { text, run } => {
                let document = mem::take(text);
                debug!("Full document of {} bytes received", document.len());
                *run = Some(core.pipeline.run_document(&document));
            }
            Self::Interactive { .. } => {}
        }
    }
}

/// Mode-independent session driver shared by the sync and async streams
struct Driver {
    core: Arc<SessionCore>,
    mode: StreamingMode,
    ingest: Option<Ingest>,
    on_update: Option<UpdateCallback>,
    pending: VecDeque<String>,
    input_done: bool,
    finished: bool,
    torn_down: bool,
    outcome: Option<Result<SessionSummary, StreamingError>>,
}

impl Driver {
    fn new(core: Arc<SessionCore>, mode: StreamingMode, on_update: Option<UpdateCallback>) -> Self {
        Self {
            core,
            mode,
            ingest: Some(Ingest::new(mode)),
            on_update,
            pending: VecDeque::new(),
            input_done: false,
            finished: false,
            torn_down: false,
            outcome: None,
        }
    }

    /// Whether the loop must stop before taking more input
    fn check_cancelled(&mut self) -> bool {
        if self.core.control.is_cancelled() {
            self.finished = true;
        }
        self.finished
    }

    fn next_step_kind(&self) -> Option<Step> {
        self.input_done.then_some(Step::Advance)
    }

    fn absorb(&mut self, ended_input: bool, more: bool, out: VecDeque<String>) {
        self.pending.extend(out);
        if ended_input {
            self.input_done = true;
        }
        if !more {
            self.finished = true;
        }
    }

    fn run_step(&mut self, step: Step) {
        let ended_input = matches!(step, Step::EndOfInput);
        let mut out = VecDeque::new();
        let more = match self.ingest.as_mut() {
            Some(ingest) => ingest.apply(&self.core, step, self.on_update.as_ref(), &mut out),
            None => false,
        };
        self.absorb(ended_input, more, out);
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let exhausted = self.input_done && self.finished;
        self.outcome = Some(self.core.teardown(self.mode, exhausted));
    }

    fn take_outcome(&mut self) -> Result<SessionSummary, StreamingError> {
        self.teardown();
        self.outcome
            .take()
            .unwrap_or_else(|| Err(StreamingError::Teardown("session already finished".to_string())))
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.teardown();
        if let Some(Err(e)) = self.outcome.take() {
            error!("Session teardown failed: {}", e);
        }
    }
}

/// Output of a synchronous session
///
/// Each `next()` checks the cancel flag and the pause gate, then consumes
/// input until some output is ready. The session is torn down when the
/// output is exhausted, when `finish` is called, or when the stream is
/// dropped.
pub struct TranslationStream<I> {
    driver: Driver,
    input: I,
}

impl<I> TranslationStream<I> {
    /// End the session and report how it went
    ///
    /// A stream finished before its input was exhausted is cancelled.
    pub fn finish(mut self) -> Result<SessionSummary, StreamingError> {
        self.driver.take_outcome()
    }

    /// Mode of the session
    pub fn mode(&self) -> StreamingMode {
        self.driver.mode
    }
}

impl<I> Iterator for TranslationStream<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(output) = self.driver.pending.pop_front() {
                return Some(output);
            }
            if self.driver.check_cancelled() {
                self.driver.teardown();
                return None;
            }

            let core = Arc::clone(&self.driver.core);
            core.control.wait_if_paused();
            if self.driver.check_cancelled() {
                continue;
            }
            core.control.mark_processing();

            let step = match self.driver.next_step_kind() {
                Some(step) => step,
                None => match self.input.next() {
                    Some(unit) => Step::Feed(unit.into()),
                    None => Step::EndOfInput,
                },
            };
            self.driver.run_step(step);
        }
    }
}

/// Output of an asynchronous session
struct AsyncSession<S> {
    driver: Driver,
    input: S,
}

impl<S> AsyncSession<S>
where
    S: Stream + Unpin,
    S::Item: Into<String> + Send,
{
    async fn next_output(&mut self) -> Option<String> {
        loop {
            if let Some(output) = self.driver.pending.pop_front() {
                return Some(output);
            }
            if self.driver.check_cancelled() {
                self.teardown().await;
                return None;
            }

            let core = Arc::clone(&self.driver.core);
            core.control.wait_if_paused_async().await;
            if self.driver.check_cancelled() {
                continue;
            }
            core.control.mark_processing();

            let step = match self.driver.next_step_kind() {
                Some(step) => step,
                None => {
                    let next_unit = tokio::select! {
                        biased;
                        _ = core.control.cancelled() => None,
                        unit = self.input.next() => Some(unit),
                    };
                    match next_unit {
                        None => continue,
                        Some(Some(unit)) => Step::Feed(unit.into()),
                        Some(None) => Step::EndOfInput,
                    }
                }
            };

            let ended_input = matches!(step, Step::EndOfInput);
            let mut ingest = self.driver.ingest.take();
            let on_update = self.driver.on_update.clone();
            let worker_core = Arc::clone(&core);
            let joined = tokio::task::spawn_blocking(move || {
                let mut out = VecDeque::new();
                let more = match ingest.as_mut() {
                    Some(state) => state.apply(&worker_core, step, on_update.as_ref(), &mut out),
                    None => false,
                };
                (ingest, out, more)
            })
            .await;

            match joined {
                Ok((ingest, out, more)) => {
                    self.driver.ingest = ingest;
                    self.driver.absorb(ended_input, more, out);
                }
                Err(e) => {
                    error!("Session worker failed: {}", e);
                    self.driver.finished = true;
                }
            }
        }
    }

    async fn teardown(&mut self) {
        if self.driver.torn_down {
            return;
        }
        self.driver.torn_down = true;
        let core = Arc::clone(&self.driver.core);
        let mode = self.driver.mode;
        let exhausted = self.driver.input_done && self.driver.finished;
        let outcome = tokio::task::spawn_blocking(move || core.teardown(mode, exhausted))
            .await
            .unwrap_or_else(|e| Err(StreamingError::Teardown(e.to_string())));
        if let Err(e) = outcome {
            error!("Session teardown failed: {}", e);
        }
    }
}

/// Real-time translator running one streaming session at a time
///
/// Cloning the handle shares the session, so `pause`, `resume` and `cancel`
/// can be called from another thread while a stream is being consumed.
#[derive(Clone)]
pub struct StreamingTranslator {
    core: Arc<SessionCore>,
}

impl StreamingTranslator {
    /// Create a translator from the application configuration
    pub fn new(config: &Config, stages: Stages) -> Self {
        let session = config.session.clone();
        let max_chunk_size = session.max_chunk_size.max(1);
        let chunking = ChunkConfig {
            max_chunk_size,
            min_chunk_size: config.chunking.min_chunk_size.min(max_chunk_size),
            overlap_size: config.chunking.overlap_size.min(max_chunk_size / 2),
            ..config.chunking.clone()
        };
        let pipeline = StreamingPipeline::new(
            config.streaming.clone(),
            chunking,
            config.buffer.clone(),
            stages.clone(),
        );
        Self::with_pipeline(session, stages, pipeline)
    }

    /// Create a translator running full documents through `pipeline`
    pub fn with_pipeline(config: SessionConfig, stages: Stages, pipeline: StreamingPipeline) -> Self {
        Self {
            core: Arc::new(SessionCore {
                events: EventBus::new(config.event_queue_capacity),
                context: Mutex::new(ContextWindow::new(config.context_window_size)),
                control: SessionControl::new(),
                session_id: Mutex::new(Uuid::nil()),
                progress: Mutex::new(StreamingProgress::default()),
                detector: RwLock::new(Arc::new(BalancedDelimiters)),
                config,
                stages,
                pipeline,
            }),
        }
    }

    /// Replace the statement heuristic used in line-by-line mode
    pub fn set_statement_detector(&self, detector: Arc<dyn StatementDetector>) {
        *self.core.detector.write() = detector;
    }

    /// Translate an input source, yielding output as units complete
    ///
    /// Fails when a session is already running or the translator cannot be
    /// warmed up.
    pub fn translate_stream<I>(
        &self,
        input: I,
        mode: StreamingMode,
        on_update: Option<UpdateCallback>,
    ) -> Result<TranslationStream<I::IntoIter>, StreamingError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.core.setup(mode)?;
        Ok(TranslationStream {
            driver: Driver::new(Arc::clone(&self.core), mode, on_update),
            input: input.into_iter(),
        })
    }

    /// Translate an async input source without blocking the caller
    ///
    /// Each unit is processed on the blocking pool; output order, events and
    /// error handling match `translate_stream`.
    pub async fn translate_stream_async<S>(
        &self,
        input: S,
        mode: StreamingMode,
        on_update: Option<UpdateCallback>,
    ) -> Result<BoxStream<'static, String>, StreamingError>
    where
        S: Stream + Send + Unpin + 'static,
        S::Item: Into<String> + Send,
    {
        let core = Arc::clone(&self.core);
        tokio::task::spawn_blocking(move || core.setup(mode))
            .await
            .map_err(|e| StreamingError::Setup(format!("setup task failed: {}", e)))??;

        let session = AsyncSession {
            driver: Driver::new(Arc::clone(&self.core), mode, on_update),
            input,
        };
        Ok(stream::unfold(session, |mut session| async move {
            let output = session.next_output().await?;
            Some((output, session))
        })
        .boxed())
    }

    /// Hold the session before its next input unit
    pub fn pause(&self) -> bool {
        self.core.control.pause()
    }

    pub fn resume(&self) -> bool {
        self.core.control.resume()
    }

    /// Stop the session at its next check-point
    pub fn cancel(&self) {
        self.core.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.core.control.is_cancelled()
    }

    /// Register a listener for session events
    pub fn add_event_listener(&self, listener: EventListener) -> ListenerId {
        self.core.events.add_listener(listener)
    }

    /// Unregister a listener; false when it was not registered
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.core.events.remove_listener(id)
    }

    pub fn state(&self) -> SessionState {
        self.core.control.state()
    }

    /// Identifier of the current or last session
    pub fn session_id(&self) -> Uuid {
        *self.core.session_id.lock()
    }

    /// Progress of the current or last session
    pub fn progress(&self) -> StreamingProgress {
        self.core.progress_snapshot()
    }

    /// Pipeline used by full-document sessions
    pub fn pipeline(&self) -> &StreamingPipeline {
        &self.core.pipeline
    }
}
