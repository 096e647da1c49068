/*!
 * Streaming progress tracking and periodic reporting.
 *
 * A run owns its `StreamingProgress` and publishes every change through a
 * `watch` channel. The reporter thread reads the latest snapshot on a fixed
 * cadence and hands it to the registered callbacks, so callbacks never see a
 * value that is being mutated.
 */

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Progress of one streaming run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingProgress {
    /// Number of chunks in the run
    pub total_chunks: usize,

    /// Number of chunks with a result
    pub processed_chunks: usize,

    /// Bytes of input covered by processed chunks
    pub bytes_processed: usize,

    /// Bytes of input in the run
    pub total_bytes: usize,

    /// Chunk most recently dispatched
    pub current_chunk: Option<usize>,

    /// Failed chunks, one entry each
    pub errors: Vec<String>,

    /// Non-fatal problems, such as blocks kept untranslated
    pub warnings: Vec<String>,
}

impl StreamingProgress {
    /// Create progress for a run over `total_chunks` chunks
    pub fn new(total_chunks: usize, total_bytes: usize) -> Self {
        Self {
            total_chunks,
            total_bytes,
            ..Default::default()
        }
    }

    /// Completion percentage (0 for an empty run)
    pub fn percentage(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        self.processed_chunks as f64 / self.total_chunks as f64 * 100.0
    }

    /// Whether every chunk has a result
    pub fn is_complete(&self) -> bool {
        self.processed_chunks >= self.total_chunks
    }
}

/// Callback invoked with progress snapshots
pub type ProgressCallback = Arc<dyn Fn(&StreamingProgress) + Send + Sync>;

/// Invoke every callback, isolating panics
pub(crate) fn notify_callbacks(callbacks: &[ProgressCallback], snapshot: &StreamingProgress) {
    for (i, callback) in callbacks.iter().enumerate() {
        if catch_unwind(AssertUnwindSafe(|| callback(snapshot))).is_err() {
            error!("Progress callback {} panicked; continuing", i);
        }
    }
}

/// Dedicated thread delivering progress snapshots on a fixed interval
pub(crate) struct ProgressReporter {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Start reporting, or return `None` when there is nobody to report to
    pub(crate) fn start(
        progress: watch::Receiver<StreamingProgress>,
        callbacks: Vec<ProgressCallback>,
        interval: Duration,
    ) -> Option<Self> {
        if callbacks.is_empty() {
            return None;
        }

        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_stop = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name("progress-reporter".to_string())
            .spawn(move || {
                let (lock, condvar) = &*thread_stop;
                loop {
                    let stopped = {
                        let mut stopped = lock.lock();
                        if !*stopped {
                            condvar.wait_for(&mut stopped, interval);
                        }
                        *stopped
                    };
                    let snapshot = progress.borrow().clone();
                    notify_callbacks(&callbacks, &snapshot);
                    if stopped {
                        break;
                    }
                }
                debug!("Progress reporter stopped");
            });

        match spawned {
            Ok(handle) => Some(Self {
                stop,
                handle: Some(handle),
            }),
            Err(e) => {
                error!("Failed to start progress reporter: {}", e);
                None
            }
        }
    }

    /// Stop the thread after one final report
    pub(crate) fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        {
            let (lock, condvar) = &*self.stop;
            *lock.lock() = true;
            condvar.notify_all();
        }
        if handle.join().is_err() {
            error!("Progress reporter thread panicked");
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
