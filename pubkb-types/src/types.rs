//! Request envelope and render status types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request envelope sent to every pubkb endpoint.
///
/// The backend expects a JSON body of the shape `{"query": <value>}` where
/// the value is an arbitrary JSON document. No validation happens on the
/// client side; query semantics are owned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Opaque query payload, passed through as-is.
    pub query: serde_json::Value,
}

impl QueryRequest {
    /// Wrap a query value in the request envelope.
    #[must_use]
    pub fn new(query: impl Into<serde_json::Value>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Observable state of one render cycle.
///
/// A successful call moves `Idle → Loading → Ready`. Failure paths settle
/// on `Failed`, a fired cancellation token on `Cancelled`. No transition
/// back to `Loading` happens until a new render call begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderStatus {
    /// No render has started yet.
    Idle,
    /// A request is in flight; chunks may still arrive.
    Loading,
    /// The stream completed and the sink holds the full output.
    Ready,
    /// The render failed; the sink holds whatever arrived before the error.
    Failed,
    /// The render was cancelled; the sink holds whatever arrived before.
    Cancelled,
}

impl fmt::Display for RenderStatus {
    /// User-visible indicator strings. `Idle` renders as the empty string,
    /// matching a pristine status surface.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "",
            Self::Loading => "Loading...",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(text)
    }
}
