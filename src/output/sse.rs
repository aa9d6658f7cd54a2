//! Server-Sent Events for real-time pose updates

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::output::PoseFrame;
use crate::AppState;

/// Create an SSE stream of pose frames
pub fn create_frame_stream(
    app_state: Arc<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app_state.subscribe_frames();

    // Convert broadcast receiver to a stream
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(frame) => Some(Ok(frame_to_event(&frame))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Convert a pose frame to an SSE event
fn frame_to_event(frame: &PoseFrame) -> Event {
    let data = serde_json::json!({
        "model": frame.model,
        "variant": frame.variant,
        "rotation": frame.rotation,
        "position": frame.position,
    });

    Event::default().event("pose").data(data.to_string())
}
