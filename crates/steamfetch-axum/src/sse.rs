//! SSE fan-out of job events.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use steamfetch_core::events::JobEvent;

/// Keep-alive interval for idle SSE connections.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Bridges the job manager's broadcast channel to any number of SSE
/// subscribers. Slow subscribers miss events rather than stalling the
/// worker; the `/api/job` snapshot is always there to resync from.
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<JobEvent>,
}

impl SseBroadcaster {
    /// Wrap the manager's event channel.
    #[must_use]
    pub const fn new(sender: broadcast::Sender<JobEvent>) -> Self {
        Self { sender }
    }

    /// SSE response streaming every event as JSON. The SSE `event:` field
    /// carries the stable event name (`job:progress`, ...).
    pub fn subscribe(
        self: Arc<Self>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let receiver = self.sender.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.event_name()).data(json))),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to serialize job event");
                    None
                }
            },
            Err(err) => {
                tracing::debug!(error = %err, "SSE subscriber lagged");
                None
            }
        });

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(KEEP_ALIVE_INTERVAL)
                .text("ping"),
        )
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
