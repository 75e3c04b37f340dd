// Chunked JSON streaming - One line per published dashboard snapshot
use crate::domain::dashboard::DashboardState;
use crate::infrastructure::json_mapper::dashboard_to_view;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;

/// Serialize a snapshot as a single newline-terminated JSON line
pub fn serialize_chunk(state: &DashboardState) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(&dashboard_to_view(state))?;
    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');
    Ok(chunk.freeze())
}

/// The current snapshot, then every later one; ends when the session is gone.
pub fn snapshot_stream(
    mut rx: watch::Receiver<Arc<DashboardState>>,
) -> impl Stream<Item = Arc<DashboardState>> {
    async_stream::stream! {
        loop {
            let state = rx.borrow_and_update().clone();
            yield state;
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Create a newline-delimited JSON streaming response
pub fn chunked_json_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Arc<DashboardState>> + Send + 'static,
{
    let byte_stream = stream.map(|state| serialize_chunk(&state));
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Helper to create a streaming response from the snapshot channel
pub fn stream_from_receiver(rx: watch::Receiver<Arc<DashboardState>>) -> impl IntoResponse {
    match chunked_json_stream(snapshot_stream(rx)) {
        Ok(response) => response.into_response(),
        Err(status) => status.into_response(),
    }
}
