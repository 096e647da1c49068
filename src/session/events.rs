/*!
 * Session event notification.
 *
 * Producers push events into a bounded queue without blocking; a dedicated
 * dispatcher thread drains the queue and calls every registered listener in
 * registration order. A panicking listener is logged and skipped, and the
 * remaining listeners still receive the event.
 */

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::pipeline::StreamingProgress;

/// Kinds of session events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingEvent {
    Started,
    ChunkStarted,
    ChunkCompleted,
    TranslationStarted,
    TranslationCompleted,
    ProgressUpdate,
    Warning,
    Error,
    Cancelled,
    Completed,
}

/// An event with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingEventData {
    /// Event kind
    pub event: StreamingEvent,

    /// When the event was produced
    pub timestamp: DateTime<Utc>,

    /// Session that produced the event
    pub session_id: Uuid,

    /// Chunk or input unit the event refers to
    pub chunk_index: Option<usize>,

    /// Progress at the time of the event
    pub progress: Option<StreamingProgress>,

    /// Event-specific details
    pub data: Option<serde_json::Value>,

    /// Error description for `Error` events
    pub error: Option<String>,

    /// Warning description for `Warning` events
    pub warning: Option<String>,
}

impl StreamingEventData {
    /// Create an event without payload
    pub fn new(event: StreamingEvent, session_id: Uuid) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
            session_id,
            chunk_index: None,
            progress: None,
            data: None,
            error: None,
            warning: None,
        }
    }

    pub fn with_chunk(mut self, chunk_index: usize) -> Self {
        self.chunk_index = Some(chunk_index);
        self
    }

    pub fn with_progress(mut self, progress: StreamingProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Callback receiving session events
pub type EventListener = Arc<dyn Fn(&StreamingEventData) + Send + Sync>;

/// Handle identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ListenerList = Arc<RwLock<Vec<(ListenerId, EventListener)>>>;

/// Bounded event queue with a dispatcher thread
pub(crate) struct EventBus {
    listeners: ListenerList,
    next_id: AtomicU64,
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<StreamingEventData>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
            sender: Mutex::new(None),
            dispatcher: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn add_listener(&self, listener: EventListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().push((id, listener));
        id
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Start a dispatcher thread for a new session
    pub(crate) fn start(&self) -> std::io::Result<()> {
        let (sender, mut receiver) = mpsc::channel::<StreamingEventData>(self.capacity);
        let listeners = Arc::clone(&self.listeners);
        let handle = thread::Builder::new()
            .name("event-dispatcher".to_string())
            .spawn(move || {
                while let Some(event) = receiver.blocking_recv() {
                    dispatch(&listeners, &event);
                }
                debug!("Event dispatcher stopped");
            })?;

        self.dropped.store(0, Ordering::SeqCst);
        *self.sender.lock() = Some(sender);
        *self.dispatcher.lock() = Some(handle);
        Ok(())
    }

    /// Queue an event without blocking; a full queue drops it
    pub(crate) fn emit(&self, event: StreamingEventData) {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            debug!("No active dispatcher, dropping {:?} event", event.event);
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::SeqCst);
                warn!("Event queue full, dropping {:?} event", event.event);
            }
            Err(TrySendError::Closed(event)) => {
                debug!("Event dispatcher closed, dropping {:?} event", event.event);
            }
        }
    }

    /// Deliver queued events and stop the dispatcher
    pub(crate) fn stop(&self) -> Result<(), String> {
        // Closing the channel lets the dispatcher drain what is queued
        self.sender.lock().take();
        let handle = self.dispatcher.lock().take();
        match handle {
            Some(handle) => handle
                .join()
                .map_err(|_| "event dispatcher thread panicked".to_string()),
            None => Ok(()),
        }
    }

    pub(crate) fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("{}", e);
        }
    }
}

fn dispatch(listeners: &ListenerList, event: &StreamingEventData) {
    let snapshot: Vec<(ListenerId, EventListener)> = listeners.read().clone();
    for (id, listener) in snapshot {
        if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
            error!("Event listener {:?} panicked on {:?} event", id, event.event);
        }
    }
}
