//! End-to-end render behavior over the public API, driven by mock chunk
//! streams. No live server required.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::Stream;
use pubkb_client::{render_stream, render_stream_with_cancel};
use pubkb_types::{QueryRequest, RenderError, RenderStatus, StatusCell, TextBuffer};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn chunk_stream(chunks: Vec<&'static str>) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    futures::stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
    )
}

#[tokio::test]
async fn hello_world_scenario() {
    // Query `{"a": 1}`, stream yields "Hello, " then "world!".
    let request = QueryRequest::new(json!({"a": 1}));
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"query": {"a": 1}})
    );

    let mut sink = TextBuffer::new();
    let mut status = StatusCell::new();
    let stream = chunk_stream(vec!["Hello, ", "world!"]);

    render_stream(stream, &mut sink, &mut status).await.unwrap();

    assert_eq!(sink.as_str(), "Hello, world!");
    assert_eq!(status.get(), RenderStatus::Ready);
    assert_eq!(status.get().to_string(), "Ready");
}

#[tokio::test]
async fn status_reads_loading_while_chunks_arrive() {
    let observer = StatusCell::new();
    let seen_mid_stream = Arc::new(Mutex::new(None));

    let cell = observer.clone();
    let record = Arc::clone(&seen_mid_stream);
    let stream = async_stream::stream! {
        // Observed from inside the stream, between the render start and the
        // first append.
        *record.lock().unwrap() = Some(cell.get());
        yield Ok::<_, std::io::Error>(Bytes::from_static(b"chunk"));
    };

    let mut sink = TextBuffer::new();
    let mut status = observer.clone();
    render_stream(stream, &mut sink, &mut status).await.unwrap();

    assert_eq!(
        *seen_mid_stream.lock().unwrap(),
        Some(RenderStatus::Loading)
    );
    assert_eq!(observer.get().to_string(), "Ready");
}

#[tokio::test]
async fn repeat_render_matches_a_single_render() {
    let mut sink = TextBuffer::new();
    let mut status = StatusCell::new();

    render_stream(chunk_stream(vec!["old ", "answer"]), &mut sink, &mut status)
        .await
        .unwrap();
    render_stream(chunk_stream(vec!["new ", "answer"]), &mut sink, &mut status)
        .await
        .unwrap();

    let mut fresh_sink = TextBuffer::new();
    let mut fresh_status = StatusCell::new();
    render_stream(
        chunk_stream(vec!["new ", "answer"]),
        &mut fresh_sink,
        &mut fresh_status,
    )
    .await
    .unwrap();

    assert_eq!(sink.as_str(), fresh_sink.as_str());
    assert_eq!(status.get(), fresh_status.get());
}

#[tokio::test]
async fn failure_leaves_partial_output_and_failed_status() {
    let mut sink = TextBuffer::new();
    let mut status = StatusCell::new();
    let stream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"BRCA1 is associated with ")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            "server went away",
        )),
    ]);

    let err = render_stream(stream, &mut sink, &mut status)
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::Interrupted(_)));
    assert!(err.is_retryable());
    assert_eq!(sink.as_str(), "BRCA1 is associated with ");
    assert_eq!(status.get(), RenderStatus::Failed);
}

#[tokio::test]
async fn cancelled_render_settles_on_cancelled_status() {
    let mut sink = TextBuffer::new();
    let mut status = StatusCell::new();
    let token = CancellationToken::new();
    token.cancel();

    let err = render_stream_with_cancel(
        chunk_stream(vec!["unreached"]),
        &mut sink,
        &mut status,
        token,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RenderError::Cancelled));
    assert_eq!(status.get(), RenderStatus::Cancelled);
    assert!(sink.is_empty());
}
