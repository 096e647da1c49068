/*!
 * Rolling text window of recent translated output.
 */

/// Fixed-capacity text buffer that keeps the most recent bytes
#[derive(Debug, Clone, Default)]
pub struct ContextWindow {
    /// Maximum number of bytes retained
    window_size: usize,

    /// Retained text, always at most `window_size` bytes
    buffer: String,
}

impl ContextWindow {
    /// Create an empty window
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            buffer: String::with_capacity(window_size),
        }
    }

    /// Append text, dropping the oldest bytes beyond the window
    ///
    /// Separate additions are joined by a newline. When `text` alone is larger
    /// than the window only its tail is kept.
    pub fn add_context(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);

        if self.buffer.len() > self.window_size {
            let mut cut = self.buffer.len() - self.window_size;
            while !self.buffer.is_char_boundary(cut) {
                cut += 1;
            }
            self.buffer.drain(..cut);
        }
    }

    /// Current window contents
    pub fn get_context(&self) -> String {
        self.buffer.clone()
    }

    /// Borrow the window contents
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Bytes currently retained
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
