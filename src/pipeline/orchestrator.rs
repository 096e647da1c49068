/*!
 * Pipeline orchestrator for streaming chunk translation.
 *
 * The orchestrator drives every chunk through three steps:
 * 1. Context: the tail of the previous chunk's output is prepended
 * 2. Parse and translate: natural-language blocks go through the translator
 * 3. Commit: the result is cached and the rolling context is updated
 *
 * Sequential runs process one chunk per `next()`. Parallel runs keep a
 * bounded window of chunks in flight on the blocking pool and yield results
 * in completion order; `assemble_streamed` restores index order.
 */

use std::borrow::Cow;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch, Notify, Semaphore};

use super::progress::{ProgressCallback, ProgressReporter, StreamingProgress};
use super::{ChunkResult, MemoryUsage, StreamConfig};
use crate::app_config::Config;
use crate::buffer::{BufferConfig, CacheStats, ContextWindow, ResultCache};
use crate::chunking::{Chunk, ChunkConfig, ChunkMetadata, CodeChunker};
use crate::stages::{Block, BlockType, ParseOutcome, Stages, TranslationContext};

/// Lines of the previous chunk's output prepended to a chunk
const CONTEXT_TAIL_LINES: usize = 10;

/// Estimated memory held by one in-flight chunk
const IN_FLIGHT_ESTIMATE_BYTES: usize = 4096;

/// State shared between the pipeline handle, its runs and its workers
struct Shared {
    config: StreamConfig,
    chunker: CodeChunker,
    stages: Stages,
    cache: Mutex<ResultCache<ChunkResult>>,
    context: Mutex<ContextWindow>,
    cancelled: AtomicBool,
    cancel_signal: Notify,
    in_flight: AtomicUsize,
    progress: watch::Sender<StreamingProgress>,
    callbacks: Mutex<Vec<ProgressCallback>>,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn previous_result(&self, index: usize) -> Option<ChunkResult> {
        if index == 0 {
            return None;
        }
        self.cache.lock().get(index - 1)
    }

    /// Chunk text with the previous chunk's tail prepended, and the number
    /// of lines the prefix adds
    fn input_with_context<'a>(
        &self,
        own: &'a str,
        chunk_index: usize,
        previous: Option<&ChunkResult>,
    ) -> (Cow<'a, str>, usize) {
        if !self.config.maintain_context_window {
            return (Cow::Borrowed(own), 0);
        }
        let Some(last) = previous.and_then(|r| r.blocks().last()) else {
            return (Cow::Borrowed(own), 0);
        };

        let lines: Vec<&str> = last.content.lines().collect();
        let tail = &lines[lines.len().saturating_sub(CONTEXT_TAIL_LINES)..];
        if tail.is_empty() {
            return (Cow::Borrowed(own), 0);
        }

        let input = format!(
            "{}\n\n# --- Chunk {} ---\n\n{}",
            tail.join("\n"),
            chunk_index,
            own
        );
        // Tail lines, blank line, marker, blank line
        (Cow::Owned(input), tail.len() + 3)
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

    /// Parse a chunk's own text behind its context prefix
    ///
    /// The prefix is dropped and the text parsed alone when the combined
    /// parse fails or yields a block running from the prefix into the chunk.
    /// Returns the outcome and the number of prefix lines it still contains.
    fn parse_chunk(&self, chunk: &Chunk, previous: Option<&ChunkResult>) -> (ParseOutcome, usize) {
        let own = chunk.own_content();
        let (input, prefix_lines) = self.input_with_context(own, chunk.index, previous);
        let outcome = self.parse(&input);
        if prefix_lines == 0 {
            return (outcome, 0);
        }

        let straddles = outcome
            .blocks
            .iter()
            .any(|b| b.line_numbers.0 <= prefix_lines && b.line_numbers.1 > prefix_lines);
        if outcome.success && !straddles {
            return (outcome, prefix_lines);
        }
        debug!(
            "Chunk {} does not parse cleanly behind its context, parsing it alone",
            chunk.index
        );
        (self.parse(own), 0)
    }

    fn translation_context(&self, chunk: &Chunk, previous: Option<&ChunkResult>) -> TranslationContext {
        let window = self.config.context_window_size;
        let overlap = chunk
            .content
            .get(..chunk.metadata.overlap_bytes)
            .filter(|overlap| !overlap.is_empty());
        let before = match (previous, overlap) {
            (Some(result), _) if !result.blocks().is_empty() => {
                let code: Vec<&str> = result
                    .blocks()
                    .iter()
                    .filter(|b| b.kind == BlockType::Code)
                    .map(|b| b.content.as_str())
                    .collect();
                tail_bytes(&code.join("\n"), window).to_string()
            }
            // Source lines repeated from the previous chunk stand in for its output
            (_, Some(overlap)) => tail_bytes(overlap, window).to_string(),
            _ => tail_bytes(self.context.lock().as_str(), window).to_string(),
        };

        TranslationContext {
            chunk_index: Some(chunk.index),
            code: before.clone(),
            before,
            mode: Some("streaming".to_string()),
            streaming: true,
            ..Default::default()
        }
    }

    fn translate_block(
        &self,
        chunk_index: usize,
        block: &Block,
        context: &TranslationContext,
        warnings: &mut Vec<String>,
    ) -> Block {
        if !block.needs_translation() {
            return block.clone();
        }

        let attempt = catch_unwind(AssertUnwindSafe(|| {
            self.stages.translator.translate(&block.content, context)
        }));
        let failure = match attempt {
            Ok(Ok(code)) => return block.translated(code),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "translator panicked".to_string(),
        };

        let message = format!(
            "Translation error in chunk {} (lines {}-{}): {}",
            chunk_index, block.line_numbers.0, block.line_numbers.1, failure
        );
        warn!("{}", message);
        warnings.push(message);

        let mut kept = block.clone();
        kept.metadata
            .insert("translation_failed".to_string(), "true".to_string());
        kept
    }

    /// Parse, translate and commit one chunk
    fn process(&self, chunk: &Chunk, abandoned: &AtomicBool) -> ChunkResult {
        let started = Instant::now();
        let elapsed_ms = || started.elapsed().as_secs_f64() * 1000.0;

        let previous = self.previous_result(chunk.index);
        let (outcome, prefix_lines) = self.parse_chunk(chunk, previous.as_ref());
        if !outcome.success {
            let detail = if outcome.errors.is_empty() {
                "unknown parse failure".to_string()
            } else {
                outcome.errors.join("; ")
            };
            return ChunkResult::failed(chunk.index, format!("Parse error: {}", detail), elapsed_ms());
        }

        // Blocks inside the context prefix repeat the previous chunk's output
        let own_start_line = chunk.start_line + overlap_lines(chunk);
        let parsed: Vec<Block> = outcome
            .blocks
            .into_iter()
            .filter(|b| b.line_numbers.1 > prefix_lines)
            .map(|b| rebase_block(b, prefix_lines, own_start_line))
            .collect();

        let context = self.translation_context(chunk, previous.as_ref());
        let mut warnings = outcome.warnings;
        let translated: Vec<Block> = parsed
            .iter()
            .map(|block| self.translate_block(chunk.index, block, &context, &mut warnings))
            .collect();

        let mut result = ChunkResult {
            index: chunk.index,
            success: true,
            parsed_blocks: Some(parsed),
            translated_blocks: Some(translated),
            error: None,
            warnings,
            processing_time_ms: 0.0,
        };
        result.processing_time_ms = elapsed_ms();
        self.commit(&result, abandoned);
        result
    }

    /// Cache a successful result and feed its code into the context window
    fn commit(&self, result: &ChunkResult, abandoned: &AtomicBool) {
        let mut cache = self.cache.lock();
        if abandoned.load(Ordering::SeqCst) {
            debug!("Discarding late result for chunk {}", result.index);
            return;
        }
        if !cache.add(result.index, result) {
            warn!("Result for chunk {} was not cached", result.index);
        }

        let mut window = self.context.lock();
        for block in result.blocks().iter().filter(|b| b.kind == BlockType::Code) {
            window.add_context(&block.content);
        }
    }

    /// Mark a chunk's computation as abandoned so its result is never committed
    fn abandon(&self, abandoned: &AtomicBool) {
        let _cache = self.cache.lock();
        abandoned.store(true, Ordering::SeqCst);
    }

    /// Fold a finished chunk into the run's progress
    fn record(&self, chunk_bytes: usize, result: &ChunkResult) {
        if let Some(error) = &result.error {
            error!("Chunk {} failed: {}", result.index, error);
        }
        self.progress.send_modify(|progress| {
            progress.processed_chunks += 1;
            progress.bytes_processed += chunk_bytes;
            if let Some(error) = &result.error {
                progress.errors.push(format!("Chunk {}: {}", result.index, error));
            }
            progress.warnings.extend(result.warnings.iter().cloned());
        });
    }
}

fn overlap_lines(chunk: &Chunk) -> usize {
    chunk
        .content
        .get(..chunk.metadata.overlap_bytes)
        .map(|prefix| prefix.matches('\n').count())
        .unwrap_or(0)
}

/// Map parser line numbers back to lines of the original source
fn rebase_block(mut block: Block, prefix_lines: usize, start_line: usize) -> Block {
    let rebase = |line: usize| start_line + line.saturating_sub(prefix_lines).max(1) - 1;
    block.line_numbers = (rebase(block.line_numbers.0), rebase(block.line_numbers.1));
    block
}

/// Last `max` bytes of a text, cut at a character boundary
fn tail_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut cut = text.len() - max;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    &text[cut..]
}

/// Chunk covering a whole document, for inputs below the streaming threshold
fn whole_document(text: &str) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    vec![Chunk {
        content: text.to_string(),
        start_line: 1,
        end_line: text.lines().count().max(1),
        start_byte: 0,
        end_byte: text.len(),
        index: 0,
        total_chunks: 1,
        metadata: ChunkMetadata {
            single_chunk: true,
            ..Default::default()
        },
    }]
}

/// Streaming translation pipeline
///
/// Cloning the handle shares the same cache, context and cancellation flag.
/// One run is active at a time: starting a run resets the cache, the context
/// window, the progress and the cancellation flag.
#[derive(Clone)]
pub struct StreamingPipeline {
    shared: Arc<Shared>,
}

impl StreamingPipeline {
    /// Create a new pipeline
    pub fn new(
        config: StreamConfig,
        chunk_config: ChunkConfig,
        buffer_config: BufferConfig,
        stages: Stages,
    ) -> Self {
        let (progress, _) = watch::channel(StreamingProgress::default());
        let context = ContextWindow::new(config.context_window_size);
        Self {
            shared: Arc::new(Shared {
                chunker: CodeChunker::new(chunk_config),
                stages,
                cache: Mutex::new(ResultCache::new(buffer_config)),
                context: Mutex::new(context),
                cancelled: AtomicBool::new(false),
                cancel_signal: Notify::new(),
                in_flight: AtomicUsize::new(0),
                progress,
                callbacks: Mutex::new(Vec::new()),
                config,
            }),
        }
    }

    /// Create a pipeline from the application configuration
    pub fn from_config(config: &Config, stages: Stages) -> Self {
        Self::new(
            config.streaming.clone(),
            config.chunking.clone(),
            config.buffer.clone(),
            stages,
        )
    }

    /// Get the streaming configuration
    pub fn config(&self) -> &StreamConfig {
        &self.shared.config
    }

    /// Whether an input is large enough to be chunked
    pub fn should_use_streaming(&self, text: &str) -> bool {
        self.shared.config.enable_streaming && text.len() >= self.shared.config.min_size_for_streaming
    }

    /// Register a callback invoked with progress snapshots during every run
    pub fn add_progress_callback(&self, callback: ProgressCallback) {
        self.shared.callbacks.lock().push(callback);
    }

    /// Snapshot of the current run's progress
    pub fn progress(&self) -> StreamingProgress {
        self.shared.progress.borrow().clone()
    }

    /// Stop the current run
    ///
    /// Chunks already running finish in the background but are not waited
    /// for; results that completed before the call are still yielded.
    pub fn cancel(&self) {
        if !self.shared.cancelled.swap(true, Ordering::SeqCst) {
            info!("Streaming run cancelled");
        }
        self.shared.cancel_signal.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Process one chunk outside of a run
    pub fn process_chunk(&self, chunk: &Chunk) -> ChunkResult {
        self.shared.process(chunk, &AtomicBool::new(false))
    }

    /// Process chunks one at a time on the calling thread
    pub fn run_sequential(&self, text: &str) -> SequentialRun {
        let chunks = self.shared.chunker.chunk(text);
        self.start_sequential(chunks, text.len(), None)
    }

    /// Process a document on the calling thread, chunking it only when it is
    /// large enough for streaming
    pub fn run_document(&self, text: &str) -> SequentialRun {
        if self.should_use_streaming(text) {
            self.run_sequential(text)
        } else {
            debug!("Input of {} bytes below streaming threshold, processing whole", text.len());
            self.start_sequential(whole_document(text), text.len(), None)
        }
    }

    /// Translate text as a stream of chunk results
    ///
    /// Sequential configurations yield results in chunk order. Parallel
    /// configurations yield them as they complete. Must be polled inside a
    /// tokio runtime.
    pub fn stream_translate(
        &self,
        text: &str,
        on_progress: Option<ProgressCallback>,
    ) -> BoxStream<'static, ChunkResult> {
        let chunks = self.shared.chunker.chunk(text);
        debug!(
            "Streaming {} bytes as {} chunks ({} mode)",
            text.len(),
            chunks.len(),
            if self.shared.config.is_parallel() { "parallel" } else { "sequential" }
        );

        if !self.shared.config.is_parallel() {
            let run = self.start_sequential(chunks, text.len(), on_progress);
            return stream::unfold(run, |mut run| async move {
                let result = run.next_async().await?;
                Some((result, run))
            })
            .boxed();
        }

        let reporter = self.begin_run(chunks.len(), text.len(), on_progress);
        let run = ParallelRun::new(Arc::clone(&self.shared), chunks, reporter);
        stream::unfold(run, |mut run| async move {
            let result = run.next_result().await?;
            Some((result, run))
        })
        .boxed()
    }

    /// Assemble every cached result in ascending chunk order
    pub fn assemble_streamed(&self) -> String {
        let blocks: Vec<Block> = {
            let mut cache = self.shared.cache.lock();
            let mut blocks = Vec::new();
            for index in cache.indices() {
                if let Some(result) = cache.get(index) {
                    blocks.extend(result.translated_blocks.unwrap_or_default());
                }
            }
            let total = self.shared.progress.borrow().total_chunks;
            if cache.len() < total {
                debug!("Assembling {} of {} chunks", cache.len(), total);
            }
            blocks
        };
        self.shared.stages.assembler.assemble(&blocks)
    }

    /// Approximate memory held by the pipeline
    pub fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage {
            buffer_size_bytes: self.shared.cache.lock().size(),
            context_window_size_bytes: self.shared.context.lock().len(),
            queue_size_estimate_bytes: self.shared.in_flight.load(Ordering::SeqCst)
                * IN_FLIGHT_ESTIMATE_BYTES,
        }
    }

    /// Statistics of the result cache
    pub fn cache_stats(&self) -> CacheStats {
        self.shared.cache.lock().stats()
    }

    fn begin_run(
        &self,
        total_chunks: usize,
        total_bytes: usize,
        extra_callback: Option<ProgressCallback>,
    ) -> Option<ProgressReporter> {
        let shared = &self.shared;
        shared.cancelled.store(false, Ordering::SeqCst);
        shared.cache.lock().clear();
        shared.context.lock().clear();
        shared.in_flight.store(0, Ordering::SeqCst);
        shared
            .progress
            .send_replace(StreamingProgress::new(total_chunks, total_bytes));

        let mut callbacks = shared.callbacks.lock().clone();
        callbacks.extend(extra_callback);
        ProgressReporter::start(
            shared.progress.subscribe(),
            callbacks,
            shared.config.progress_interval(),
        )
    }

    fn start_sequential(
        &self,
        chunks: Vec<Chunk>,
        total_bytes: usize,
        extra_callback: Option<ProgressCallback>,
    ) -> SequentialRun {
        let reporter = self.begin_run(chunks.len(), total_bytes, extra_callback);
        SequentialRun {
            shared: Arc::clone(&self.shared),
            total: chunks.len(),
            chunks: chunks.into_iter(),
            reporter,
        }
    }
}

/// A sequential run, yielding one chunk result per `next()`
pub struct SequentialRun {
    shared: Arc<Shared>,
    total: usize,
    chunks: std::vec::IntoIter<Chunk>,
    reporter: Option<ProgressReporter>,
}

impl SequentialRun {
    /// Number of chunks in the run
    pub fn total_chunks(&self) -> usize {
        self.total
    }

    /// Number of chunks not yet processed
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }

    fn take_next(&mut self) -> Option<Chunk> {
        if self.shared.is_cancelled() {
            if !self.chunks.as_slice().is_empty() {
                info!("Sequential run stopped with {} chunks left", self.chunks.len());
                self.chunks = Vec::new().into_iter();
            }
            self.finish();
            return None;
        }
        let Some(chunk) = self.chunks.next() else {
            self.finish();
            return None;
        };
        self.shared
            .progress
            .send_modify(|p| p.current_chunk = Some(chunk.index));
        self.shared.in_flight.store(1, Ordering::SeqCst);
        Some(chunk)
    }

    fn complete(&self, chunk_bytes: usize, result: &ChunkResult) {
        self.shared.in_flight.store(0, Ordering::SeqCst);
        self.shared.record(chunk_bytes, result);
    }

    async fn next_async(&mut self) -> Option<ChunkResult> {
        let chunk = self.take_next()?;
        let index = chunk.index;
        let chunk_bytes = chunk.own_content().len();
        let shared = Arc::clone(&self.shared);

        let result =
            match tokio::task::spawn_blocking(move || shared.process(&chunk, &AtomicBool::new(false))).await {
                Ok(result) => result,
                Err(e) => ChunkResult::failed(index, format!("Chunk {} worker failed: {}", index, e), 0.0),
            };
        self.complete(chunk_bytes, &result);
        Some(result)
    }

    fn finish(&mut self) {
        if let Some(mut reporter) = self.reporter.take() {
            reporter.stop();
        }
    }
}

impl Iterator for SequentialRun {
    type Item = ChunkResult;

    fn next(&mut self) -> Option<ChunkResult> {
        let chunk = self.take_next()?;
        let result = self.shared.process(&chunk, &AtomicBool::new(false));
        self.complete(chunk.own_content().len(), &result);
        Some(result)
    }
}

type ResultMessage = (usize, ChunkResult);

/// A parallel run: bounded dispatch plus a single collector
struct ParallelRun {
    shared: Arc<Shared>,
    pending: VecDeque<Chunk>,
    sender: mpsc::Sender<ResultMessage>,
    results: mpsc::Receiver<ResultMessage>,
    workers: Arc<Semaphore>,
    outstanding: usize,
    window: usize,
    reporter: Option<ProgressReporter>,
    draining: bool,
    done: bool,
}

impl ParallelRun {
    fn new(shared: Arc<Shared>, chunks: Vec<Chunk>, reporter: Option<ProgressReporter>) -> Self {
        let config = &shared.config;
        let (sender, results) = mpsc::channel(config.max_queue_size.max(1));
        let workers = Arc::new(Semaphore::new(config.thread_pool_size.max(1)));
        let window = if config.enable_backpressure {
            config.max_concurrent_chunks.max(1)
        } else {
            usize::MAX
        };
        Self {
            pending: chunks.into(),
            sender,
            results,
            workers,
            outstanding: 0,
            window,
            reporter,
            draining: false,
            done: false,
            shared,
        }
    }

    /// Fill the in-flight window from the pending chunks
    fn dispatch(&mut self) {
        while self.outstanding < self.window {
            let Some(chunk) = self.pending.pop_front() else {
                break;
            };
            self.shared
                .progress
                .send_modify(|p| p.current_chunk = Some(chunk.index));
            self.outstanding += 1;
            tokio::spawn(run_chunk(
                Arc::clone(&self.shared),
                chunk,
                Arc::clone(&self.workers),
                self.sender.clone(),
            ));
        }
        self.shared.in_flight.store(self.outstanding, Ordering::SeqCst);
    }

    fn accept(&mut self, message: ResultMessage) -> ChunkResult {
        let (chunk_bytes, result) = message;
        self.outstanding = self.outstanding.saturating_sub(1);
        self.shared.in_flight.store(self.outstanding, Ordering::SeqCst);
        self.shared.record(chunk_bytes, &result);
        result
    }

    fn begin_drain(&mut self) {
        if !self.draining {
            debug!(
                "Parallel run cancelled with {} chunks pending and {} in flight",
                self.pending.len(),
                self.outstanding
            );
            self.draining = true;
            self.pending.clear();
            self.workers.close();
        }
    }

    async fn next_result(&mut self) -> Option<ChunkResult> {
        if self.done {
            return None;
        }

        if !self.draining && self.shared.is_cancelled() {
            self.begin_drain();
        }

        if !self.draining {
            self.dispatch();
            if self.outstanding == 0 {
                self.finish();
                return None;
            }

            let shared = Arc::clone(&self.shared);
            let cancelled = shared.cancel_signal.notified();
            tokio::pin!(cancelled);
            cancelled.as_mut().enable();

            if !shared.is_cancelled() {
                let received = tokio::select! {
                    biased;
                    _ = &mut cancelled => None,
                    message = self.results.recv() => Some(message),
                };
                match received {
                    Some(Some(message)) => return Some(self.accept(message)),
                    Some(None) => {
                        self.finish();
                        return None;
                    }
                    None => {}
                }
            }
            self.begin_drain();
        }

        // Cancelled: only results that already completed are yielded
        match self.results.try_recv() {
            Ok(message) => Some(self.accept(message)),
            Err(_) => {
                self.finish();
                None
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.results.close();
        self.shared.in_flight.store(0, Ordering::SeqCst);
        if let Some(mut reporter) = self.reporter.take() {
            reporter.stop();
        }
    }
}

/// Worker task: wait for a pool slot, then process the chunk under a timeout
async fn run_chunk(
    shared: Arc<Shared>,
    chunk: Chunk,
    workers: Arc<Semaphore>,
    results: mpsc::Sender<ResultMessage>,
) {
    let Ok(_permit) = workers.acquire_owned().await else {
        return;
    };
    if shared.is_cancelled() {
        return;
    }

    let index = chunk.index;
    let chunk_bytes = chunk.own_content().len();
    let timeout = shared.config.chunk_timeout();
    let abandoned = Arc::new(AtomicBool::new(false));
    let started = Instant::now();

    let worker = {
        let shared = Arc::clone(&shared);
        let abandoned = Arc::clone(&abandoned);
        tokio::task::spawn_blocking(move || shared.process(&chunk, &abandoned))
    };

    let result = match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => ChunkResult::failed(
            index,
            format!("Chunk {} worker failed: {}", index, e),
            started.elapsed().as_secs_f64() * 1000.0,
        ),
        Err(_) => {
            shared.abandon(&abandoned);
            warn!("Chunk {} timed out after {} ms", index, shared.config.chunk_timeout_ms);
            ChunkResult::failed(
                index,
                format!("Chunk {} timed out after {} ms", index, shared.config.chunk_timeout_ms),
                started.elapsed().as_secs_f64() * 1000.0,
            )
        }
    };

    if results.send((chunk_bytes, result)).await.is_err() {
        debug!("Result for chunk {} arrived after the run ended", index);
    }
}
