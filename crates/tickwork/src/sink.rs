//! Output seams
//!
//! Tick bodies hand their results to these traits; drawing and text display
//! live outside the crate.

use std::sync::{Mutex, PoisonError};

use crate::bodies::FrameView;

/// Receives computation text lines
pub trait ProgressSink: Send + Sync {
    /// Append one line (no trailing newline)
    fn emit(&self, line: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Draws an animation frame
pub trait FrameRenderer: Send {
    fn render_frame(&mut self, frame: &FrameView<'_>);
}

impl<F> FrameRenderer for F
where
    F: FnMut(&FrameView<'_>) + Send,
{
    fn render_frame(&mut self, frame: &FrameView<'_>) {
        self(frame)
    }
}

/// Draws the marquee strip
pub trait MarqueeRenderer: Send {
    /// `offset` is the x position of the first glyph
    fn render_marquee(&mut self, text: &str, offset: i32);
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn render_frame(&mut self, _frame: &FrameView<'_>) {}
}

impl MarqueeRenderer for NullRenderer {
    fn render_marquee(&mut self, _text: &str, _offset: i32) {}
}

/// Append-only text buffer keeping the most recent characters
#[derive(Debug)]
pub struct ProgressLog {
    /// Buffered text, newline separated
    text: Mutex<String>,
    /// Maximum retained characters
    capacity: usize,
}

impl ProgressLog {
    /// Create an empty log holding at most `capacity` characters
    pub fn new(capacity: usize) -> Self {
        Self {
            text: Mutex::new(String::new()),
            capacity: capacity.max(1),
        }
    }

    /// Retained text
    pub fn contents(&self) -> String {
        self.text.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Retained lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Number of retained lines
    pub fn line_count(&self) -> usize {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lines()
            .count()
    }

    /// Maximum retained characters
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl ProgressSink for ProgressLog {
    fn emit(&self, line: &str) {
        let mut text = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        text.push_str(line);
        text.push('\n');

        let excess = text.chars().count().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }

        let cut = text
            .char_indices()
            .nth(excess)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        // Prefer cutting at a line start so no partial line survives
        let at_line_start = cut == 0 || text.as_bytes()[cut - 1] == b'\n';
        let cut = match text[cut..].find('\n') {
            Some(nl) if !at_line_start && cut + nl + 1 < text.len() => cut + nl + 1,
            _ => cut,
        };
        text.drain(..cut);
    }
}
