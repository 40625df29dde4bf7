//! Display surface traits and in-memory implementations.
//!
//! A renderer never looks up its output surface by name; it is handed
//! explicit sinks. Anything that can show accumulating text implements
//! [`DisplaySink`], anything that can show a one-line indicator implements
//! [`StatusSink`].

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::RenderStatus;

/// A mutable text surface for streamed output.
///
/// Between a `clear` and the end of the stream the surface is append-only:
/// chunks arrive in order and are never rewritten.
pub trait DisplaySink {
    /// Reset the surface to empty. Called once at the start of each render.
    fn clear(&mut self);

    /// Append a decoded text chunk verbatim. No escaping is applied; the
    /// surface is trusted to render raw text as-is.
    fn append(&mut self, chunk: &str);
}

/// A one-line status surface.
pub trait StatusSink {
    /// Replace the displayed status.
    fn set_status(&mut self, status: RenderStatus);
}

/// String-backed [`DisplaySink`].
#[derive(Debug, Default)]
pub struct TextBuffer {
    inner: String,
}

impl TextBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether nothing has been appended since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl DisplaySink for TextBuffer {
    fn clear(&mut self) {
        self.inner.clear();
    }

    fn append(&mut self, chunk: &str) {
        self.inner.push_str(chunk);
    }
}

/// Cloneable shared status cell.
///
/// Hand one clone to the renderer as its [`StatusSink`] and keep another to
/// observe progress while the render is in flight.
#[derive(Debug, Clone)]
pub struct StatusCell {
    inner: Arc<Mutex<RenderStatus>>,
}

impl StatusCell {
    /// Create a cell starting at [`RenderStatus::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RenderStatus::Idle)),
        }
    }

    /// The current status.
    #[must_use]
    pub fn get(&self) -> RenderStatus {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusCell {
    fn set_status(&mut self, status: RenderStatus) {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = status;
    }
}
