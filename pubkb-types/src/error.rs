//! Error types for pubkb render operations.

/// Errors from a render or query operation.
///
/// Every failure path settles the status indicator on a terminal state
/// before the error is returned; a caller never observes a render stuck
/// in `Loading`.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    // Retryable errors
    /// Request could not be sent or no response arrived (connection
    /// refused, DNS failure, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Connection dropped mid-stream. Output appended before the drop
    /// stays in the sink.
    #[error("stream interrupted: {0}")]
    Interrupted(String),
    /// Non-2xx response received before any chunk.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, if it could be read.
        body: String,
    },

    // Terminal errors
    /// Byte stream is not valid UTF-8, including a truncated multi-byte
    /// sequence at end of stream. Nothing from the offending chunk is
    /// appended.
    #[error("invalid UTF-8 in response stream: {0}")]
    Decode(String),
    /// Response body could not be parsed in the expected format.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Cancellation token fired between chunks.
    #[error("render cancelled")]
    Cancelled,
    /// A render is already in flight on a single-flight client.
    #[error("render already in flight")]
    Busy,

    // Catch-all
    /// Any other render error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    /// Whether this error is likely transient and the request can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Interrupted(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
