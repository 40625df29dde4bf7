//! Streaming render loop: byte chunks in, text appended to a sink.
//!
//! [`render_stream`] drives one render cycle from any transport that yields
//! byte chunks, not only an HTTP response body. Chunks are decoded and
//! appended strictly in arrival order; the loop suspends only while waiting
//! for the next chunk.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use pubkb_types::{DisplaySink, RenderError, RenderStatus, StatusSink};
use tokio_util::sync::CancellationToken;

use crate::decode::StreamDecoder;

/// Decode a raw byte stream into text chunks.
///
/// Partial multi-byte scalars at chunk boundaries are carried over to the
/// next chunk. The stream ends at the first error: a transport failure
/// yields [`RenderError::Interrupted`], bad bytes yield
/// [`RenderError::Decode`], and nothing after the error is produced.
pub fn text_chunks<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, RenderError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut decoder = StreamDecoder::new();
        let mut bytes_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    yield Err(RenderError::Interrupted(e.to_string()));
                    return;
                }
            };

            let text = match decoder.decode(&chunk) {
                Ok(t) => t,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            if !text.is_empty() {
                yield Ok(text);
            }
        }

        // A partial scalar dangling at end of stream is a decode error.
        if let Err(e) = decoder.finish() {
            yield Err(e);
        }
    }
}

/// Drive one render cycle from an already-open byte stream.
///
/// Sets the status to [`RenderStatus::Loading`], clears the sink, appends
/// each decoded text chunk verbatim as it arrives, and settles the status
/// on [`RenderStatus::Ready`] at end of stream or [`RenderStatus::Failed`]
/// on error. Output appended before a failure stays in the sink.
pub async fn render_stream<S, E>(
    byte_stream: S,
    sink: &mut impl DisplaySink,
    status: &mut impl StatusSink,
) -> Result<(), RenderError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    status.set_status(RenderStatus::Loading);
    sink.clear();
    consume(byte_stream, sink, status, None).await
}

/// Like [`render_stream`], but stops consuming at the next chunk boundary
/// once `token` is cancelled, settling the status on
/// [`RenderStatus::Cancelled`]. Already-appended content stays in the sink.
pub async fn render_stream_with_cancel<S, E>(
    byte_stream: S,
    sink: &mut impl DisplaySink,
    status: &mut impl StatusSink,
    token: CancellationToken,
) -> Result<(), RenderError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    status.set_status(RenderStatus::Loading);
    sink.clear();
    consume(byte_stream, sink, status, Some(token)).await
}

/// The read loop shared by the transport-agnostic entry points and
/// [`KbClient`](crate::KbClient). Start side effects (Loading + clear)
/// have already happened by the time this runs.
pub(crate) async fn consume<S, E>(
    byte_stream: S,
    sink: &mut impl DisplaySink,
    status: &mut impl StatusSink,
    token: Option<CancellationToken>,
) -> Result<(), RenderError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut chunks = std::pin::pin!(text_chunks(byte_stream));

    loop {
        let next = match &token {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    status.set_status(RenderStatus::Cancelled);
                    return Err(RenderError::Cancelled);
                }
                next = chunks.next() => next,
            },
            None => chunks.next().await,
        };

        match next {
            Some(Ok(text)) => sink.append(&text),
            Some(Err(e)) => {
                status.set_status(RenderStatus::Failed);
                return Err(e);
            }
            None => break,
        }
    }

    status.set_status(RenderStatus::Ready);
    Ok(())
}
