/*!
 * Session lifecycle and flow control.
 *
 * `SessionControl` owns the session state machine together with the cancel
 * flag and the pause gate. Ingestion loops call `wait_if_paused` (or its
 * async twin) before consuming each input unit; the wait blocks on a condvar
 * or a `Notify` and is released by `resume` or `cancel`.
 */

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::errors::StreamingError;

/// Lifecycle state of a streaming session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Started,
    Processing,
    Paused,
    Cancelled,
    Error,
    Completed,
}

impl SessionState {
    /// Whether a session in this state is running
    pub fn is_active(self) -> bool {
        matches!(self, Self::Started | Self::Processing | Self::Paused)
    }

    /// Whether the session has ended
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Error | Self::Completed)
    }

    /// Whether the state machine allows moving from `self` to `to`
    pub fn can_transition(self, to: SessionState) -> bool {
        use SessionState::*;
        match (self, to) {
            (Idle, Started) => true,
            (Idle, Cancelled) => true,
            (from, Started) if from.is_terminal() => true,
            (Started | Processing | Paused, Cancelled | Error) => true,
            (Started, Processing | Paused | Completed) => true,
            (Processing, Paused | Completed) => true,
            (Paused, Processing | Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Processing => "processing",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
            Self::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// State machine, cancel flag and pause gate of one session
#[derive(Debug, Default)]
pub(crate) struct SessionControl {
    state: Mutex<SessionState>,
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
    resume_signal: Notify,
    cancel_signal: Notify,
}

impl SessionControl {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Move to `to`, returning the previous state
    pub(crate) fn transition(&self, to: SessionState) -> Result<SessionState, StreamingError> {
        let mut state = self.state.lock();
        let from = *state;
        if !from.can_transition(to) {
            return Err(StreamingError::InvalidTransition { from, to });
        }
        *state = to;
        debug!("Session state {} -> {}", from, to);
        Ok(from)
    }

    /// Start a session, resetting the cancel flag and the pause gate
    pub(crate) fn begin(&self) -> Result<(), StreamingError> {
        let mut state = self.state.lock();
        if state.is_active() {
            return Err(StreamingError::AlreadyRunning(*state));
        }
        debug!("Session state {} -> {}", *state, SessionState::Started);
        *state = SessionState::Started;
        self.cancelled.store(false, Ordering::SeqCst);
        *self.paused.lock() = false;
        Ok(())
    }

    /// Mark the first unit of work
    pub(crate) fn mark_processing(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Started {
            *state = SessionState::Processing;
        }
    }

    /// Close the pause gate; returns false when the session cannot pause
    pub(crate) fn pause(&self) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, SessionState::Started | SessionState::Processing) {
            return false;
        }
        *state = SessionState::Paused;
        *self.paused.lock() = true;
        info!("Session paused");
        true
    }

    /// Open the pause gate; returns false when the session was not paused
    pub(crate) fn resume(&self) -> bool {
        let mut state = self.state.lock();
        if *state != SessionState::Paused {
            return false;
        }
        *state = SessionState::Processing;
        self.release_pause();
        info!("Session resumed");
        true
    }

    /// Set the cancel flag; returns true the first time
    pub(crate) fn cancel(&self) -> bool {
        let first = !self.cancelled.swap(true, Ordering::SeqCst);
        {
            let mut state = self.state.lock();
            if state.is_active() || *state == SessionState::Idle {
                *state = SessionState::Cancelled;
            }
        }
        self.release_pause();
        self.cancel_signal.notify_waiters();
        if first {
            info!("Session cancelled");
        }
        first
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    /// Mark normal exhaustion of input
    pub(crate) fn complete(&self) -> Result<SessionState, StreamingError> {
        self.transition(SessionState::Completed)
    }

    /// Mark a setup or teardown failure
    pub(crate) fn fail(&self) {
        let mut state = self.state.lock();
        if !state.is_terminal() || *state == SessionState::Completed {
            *state = SessionState::Error;
        }
    }

    /// Block the calling thread while the gate is closed
    pub(crate) fn wait_if_paused(&self) {
        let mut paused = self.paused.lock();
        while *paused && !self.is_cancelled() {
            self.resumed.wait(&mut paused);
        }
    }

    /// Wait without blocking the executor while the gate is closed
    pub(crate) async fn wait_if_paused_async(&self) {
        loop {
            let resumed = self.resume_signal.notified();
            tokio::pin!(resumed);
            resumed.as_mut().enable();
            if !self.is_paused() || self.is_cancelled() {
                return;
            }
            resumed.await;
        }
    }

    /// Resolve once the session is cancelled
    pub(crate) async fn cancelled(&self) {
        loop {
            let signal = self.cancel_signal.notified();
            tokio::pin!(signal);
            signal.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            signal.await;
        }
    }

    fn release_pause(&self) {
        let mut paused = self.paused.lock();
        *paused = false;
        self.resumed.notify_all();
        self.resume_signal.notify_waiters();
    }
}
