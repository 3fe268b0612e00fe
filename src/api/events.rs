use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::services::EventBus;

/// Live event stream
///
/// Each SSE event is named after the event `type` (`tone_play`,
/// `color_count_adjusted`, `palette_rebuilt`, `rebuild_failed`) and carries
/// the event as JSON. A client that falls behind receives a `lagged` event.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Server-sent events", content_type = "text/event-stream"),
    ),
    tag = "Events"
)]
pub async fn handle_events(
    State(events): State<EventBus>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = events.subscribe();

    let stream = BroadcastStream::new(rx).map(|result| match result {
        Ok(stamped) => Ok(Event::default()
            .event(stamped.event.name())
            .data(serde_json::to_string(&stamped).unwrap_or_default())),
        Err(_) => Ok(Event::default().event("lagged").data("lagged")),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
