// Chunked snapshot streaming - one length-prefixed JSON chunk per snapshot
use crate::domain::snapshot::Snapshot;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Content type of the framed stream: u32 big-endian length, then payload.
pub const CHUNKED_CONTENT_TYPE: &str = "application/x-snapshot-stream";

/// Create a chunked streaming response
pub async fn chunked_snapshot_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Arc<Snapshot>> + Send + 'static,
{
    let byte_stream = stream.then(move |snapshot| async move { serialize_chunk(&snapshot, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header: the
    // client must not try to decompress the framed stream as a whole.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CHUNKED_CONTENT_TYPE)
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single snapshot to a chunk
pub async fn serialize_chunk(snapshot: &Snapshot, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(snapshot).map_err(std::io::Error::other)?;

    let payload = if compress {
        let cursor = std::io::Cursor::new(buffer);
        let mut encoder = BrotliEncoder::new(cursor);
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await?;
        compressed
    } else {
        buffer
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream every snapshot published after (and including) the current one
pub async fn stream_from_watch(
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        let mut updates = WatchStream::new(rx);
        while let Some(update) = updates.next().await {
            if let Some(snapshot) = update {
                yield snapshot;
            }
        }
    };

    match chunked_snapshot_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
