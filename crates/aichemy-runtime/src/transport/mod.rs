//! Agent transports: decode one request's reply into a finite event stream.

mod http;
mod mock;
pub mod reply;
pub mod sse;

pub use http::HttpTransport;
pub use mock::MockTransport;
pub use sse::SseDecoder;

use aichemy_types::{AgentRequest, StreamEvent};
use async_trait::async_trait;
use futures::{Stream, StreamExt, future};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// Lazy, finite sequence of events for one turn
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Open one request.
    ///
    /// Connection failures and non-success statuses are returned here,
    /// before any event. The returned stream ends after `done`, when the
    /// server closes the connection, or once `cancel` fires.
    async fn open(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream>;

    /// Short label for logs and `--format json` output
    fn name(&self) -> &'static str;
}

/// Bound a raw event stream by cancellation and by the first `done`.
///
/// Events already yielded stay valid; the record being read when `cancel`
/// fires is discarded whole.
pub fn bounded<S>(events: S, cancel: CancellationToken) -> EventStream
where
    S: Stream<Item = StreamEvent> + Send + 'static,
{
    let mut finished = false;
    let events = events
        .take_until(cancel.cancelled_owned())
        .take_while(move |event| {
            let keep = !finished;
            if event.is_done() {
                finished = true;
            }
            future::ready(keep)
        });
    Box::pin(events)
}
