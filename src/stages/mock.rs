/*!
 * Mock translator implementations for testing.
 *
 * This module provides a mock translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with a `print(...)` statement
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockTranslator::intermittent(n)` - Fails every nth request
 * - `MockTranslator::slow(ms)` - Succeeds after a delay
 * - `MockTranslator::unavailable()` - Fails at warm-up
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::{CodeTranslator, TranslationContext};
use crate::errors::TranslateError;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an error
    Failing,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails for instructions containing a marker
    FailingOn { marker: String },
    /// Succeeds after a delay (for timeout testing)
    Slow { delay_ms: u64 },
    /// Cannot be warmed up
    Unavailable,
}

/// Mock translator for testing pipeline behavior
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: AtomicUsize,
    /// Context of the most recent request
    last_context: Mutex<Option<TranslationContext>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock translator
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that fails on instructions containing `marker`
    pub fn failing_on(marker: &str) -> Self {
        Self::new(MockBehavior::FailingOn {
            marker: marker.to_string(),
        })
    }

    /// Create a slow mock translator
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock translator whose warm-up fails
    pub fn unavailable() -> Self {
        Self::new(MockBehavior::Unavailable)
    }

    /// Number of translate calls received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Context passed with the most recent translate call
    pub fn last_context(&self) -> Option<TranslationContext> {
        self.last_context.lock().clone()
    }

    /// The code the working behavior produces for an instruction
    pub fn expected_output(instruction: &str) -> String {
        format!("print({:?})", instruction.trim())
    }
}

impl CodeTranslator for MockTranslator {
    fn translate(
        &self,
        instruction: &str,
        context: &TranslationContext,
    ) -> Result<String, TranslateError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_context.lock() = Some(context.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(Self::expected_output(instruction)),
            MockBehavior::Failing => Err(TranslateError::Failed(format!(
                "mock failure for '{}'",
                instruction.trim()
            ))),
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == 0 {
                    Err(TranslateError::Failed(format!("intermittent failure on request {}", count)))
                } else {
                    Ok(Self::expected_output(instruction))
                }
            }
            MockBehavior::FailingOn { marker } => {
                if instruction.contains(marker.as_str()) {
                    Err(TranslateError::Failed(format!("cannot translate '{}'", instruction.trim())))
                } else {
                    Ok(Self::expected_output(instruction))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                thread::sleep(Duration::from_millis(*delay_ms));
                Ok(Self::expected_output(instruction))
            }
            MockBehavior::Unavailable => Err(TranslateError::Unavailable(
                "mock translator is offline".to_string(),
            )),
        }
    }

    fn warm_up(&self) -> Result<(), TranslateError> {
        match self.behavior {
            MockBehavior::Unavailable => Err(TranslateError::Unavailable(
                "mock translator is offline".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
