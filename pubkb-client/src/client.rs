//! pubkb API client struct and builder.

use std::sync::atomic::{AtomicBool, Ordering};

use pubkb_types::{DisplaySink, QueryRequest, RenderError, RenderStatus, StatusSink};
use tokio_util::sync::CancellationToken;

use crate::error::{map_http_status, map_reqwest_error};
use crate::streaming::consume;

/// Default server base URL.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:12345";

/// Default streaming endpoint path.
const DEFAULT_RUN_PATH: &str = "/run_qa";

/// Default JSON endpoint path.
const DEFAULT_QUERY_PATH: &str = "/query_qa";

/// Client for pubkb query endpoints.
///
/// Streaming renders are single-flight by default: a second
/// [`render_streamed`](Self::render_streamed) while one is in flight
/// returns [`RenderError::Busy`] instead of interleaving writes into the
/// same sink. Opt into concurrent renders with
/// [`allow_concurrent`](Self::allow_concurrent) if the caller owns buffer
/// discipline (for example, one sink per panel).
///
/// # Example
///
/// ```no_run
/// use pubkb_client::KbClient;
///
/// let client = KbClient::new()
///     .base_url("http://127.0.0.1:12345")
///     .run_path("/run_chemical_disease_qa")
///     .query_path("/query_chemical_disease_qa");
/// ```
pub struct KbClient {
    /// Server base URL.
    pub(crate) base_url: String,
    /// Path of the streaming `run_*` endpoint.
    pub(crate) run_path: String,
    /// Path of the JSON `query_*` endpoint.
    pub(crate) query_path: String,
    /// Whether overlapping streaming renders are permitted.
    pub(crate) allow_concurrent: bool,
    /// Single-flight flag for streaming renders.
    in_flight: AtomicBool,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl KbClient {
    /// Create a new client with sensible defaults.
    ///
    /// Default base URL: `http://127.0.0.1:12345`.
    /// Default endpoints: `/run_qa` (streaming) and `/query_qa` (JSON).
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            run_path: DEFAULT_RUN_PATH.into(),
            query_path: DEFAULT_QUERY_PATH.into(),
            allow_concurrent: false,
            in_flight: AtomicBool::new(false),
            client: reqwest::Client::new(),
        }
    }

    /// Override the server base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the streaming endpoint path.
    #[must_use]
    pub fn run_path(mut self, path: impl Into<String>) -> Self {
        self.run_path = path.into();
        self
    }

    /// Override the JSON endpoint path.
    #[must_use]
    pub fn query_path(mut self, path: impl Into<String>) -> Self {
        self.query_path = path.into();
        self
    }

    /// Permit overlapping streaming renders.
    ///
    /// With this set, the caller is responsible for serializing access to
    /// any shared sink; two in-flight renders into one sink interleave
    /// with undefined ordering between their chunk sequences.
    #[must_use]
    pub fn allow_concurrent(mut self, allow: bool) -> Self {
        self.allow_concurrent = allow;
        self
    }

    /// Full URL of the streaming endpoint.
    pub(crate) fn run_url(&self) -> String {
        format!("{}{}", self.base_url, self.run_path)
    }

    /// Full URL of the JSON endpoint.
    pub(crate) fn query_url(&self) -> String {
        format!("{}{}", self.base_url, self.query_path)
    }

    /// Stream a query's response text into `sink` as it arrives.
    ///
    /// Sets `status` to [`RenderStatus::Loading`] and clears `sink` before
    /// sending, appends each decoded chunk in arrival order, and settles on
    /// [`RenderStatus::Ready`] at end of stream. Any failure settles on
    /// [`RenderStatus::Failed`] and is returned; the sink keeps whatever
    /// arrived before the failure.
    pub async fn render_streamed(
        &self,
        query: serde_json::Value,
        sink: &mut impl DisplaySink,
        status: &mut impl StatusSink,
    ) -> Result<(), RenderError> {
        self.render_inner(query, sink, status, None).await
    }

    /// Like [`render_streamed`](Self::render_streamed), stopping at the
    /// next chunk boundary once `token` is cancelled and settling on
    /// [`RenderStatus::Cancelled`].
    pub async fn render_streamed_with_cancel(
        &self,
        query: serde_json::Value,
        sink: &mut impl DisplaySink,
        status: &mut impl StatusSink,
        token: CancellationToken,
    ) -> Result<(), RenderError> {
        self.render_inner(query, sink, status, Some(token)).await
    }

    async fn render_inner(
        &self,
        query: serde_json::Value,
        sink: &mut impl DisplaySink,
        status: &mut impl StatusSink,
        token: Option<CancellationToken>,
    ) -> Result<(), RenderError> {
        // Acquire before touching sink or status: a Busy overlap must leave
        // the in-flight render's surfaces alone.
        let _guard = self.acquire_flight()?;

        status.set_status(RenderStatus::Loading);
        sink.clear();

        let url = self.run_url();
        let body = QueryRequest::new(query);
        tracing::debug!(url = %url, "sending streaming query");

        let response = match self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                status.set_status(RenderStatus::Failed);
                return Err(map_reqwest_error(e));
            }
        };

        let status_code = response.status();
        if !status_code.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            status.set_status(RenderStatus::Failed);
            return Err(map_http_status(status_code, &body_text));
        }

        let result = consume(response.bytes_stream(), sink, status, token).await;
        tracing::debug!(url = %url, ok = result.is_ok(), "streaming query finished");
        result
    }

    /// Send a query to the JSON endpoint and return the full response
    /// document.
    ///
    /// This is the non-streaming sibling of
    /// [`render_streamed`](Self::render_streamed); it touches neither sink
    /// nor status and is not subject to the single-flight guard.
    pub async fn query_json(
        &self,
        query: serde_json::Value,
    ) -> Result<serde_json::Value, RenderError> {
        let url = self.query_url();
        let body = QueryRequest::new(query);
        tracing::debug!(url = %url, "sending json query");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status_code = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;

        if !status_code.is_success() {
            return Err(map_http_status(status_code, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| RenderError::InvalidResponse(format!("invalid JSON response: {e}")))
    }

    /// Mark a streaming render in flight, unless one already is.
    fn acquire_flight(&self) -> Result<FlightGuard<'_>, RenderError> {
        if self.allow_concurrent {
            return Ok(FlightGuard { flag: None });
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(RenderError::Busy);
        }
        Ok(FlightGuard {
            flag: Some(&self.in_flight),
        })
    }
}

impl Default for KbClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the in-flight flag when the render completes, fails, or is
/// cancelled.
struct FlightGuard<'a> {
    flag: Option<&'a AtomicBool>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag {
            flag.store(false, Ordering::Release);
        }
    }
}
