use aichemy_runtime::transport::{AgentTransport, EventStream, bounded};
use aichemy_runtime::{Error, Result};
use aichemy_types::{AgentRequest, StreamEvent};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

enum Reply {
    Events(Vec<StreamEvent>),
    Live(mpsc::UnboundedReceiver<StreamEvent>),
    Fail { status: u16, body: String },
    Stall,
}

/// Agent transport answering each request with the next queued reply.
///
/// Every request is recorded so tests can inspect history and skill tags.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fixed event sequence
    pub fn with_reply(self, events: Vec<StreamEvent>) -> Self {
        self.push_reply(events);
        self
    }

    pub fn push_reply(&self, events: Vec<StreamEvent>) {
        self.queue(Reply::Events(events));
    }

    /// Queue a reply whose events are fed by the returned sender; the stream
    /// ends when the sender is dropped
    pub fn push_live(&self) -> mpsc::UnboundedSender<StreamEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.queue(Reply::Live(rx));
        tx
    }

    /// Queue a reply that never connects; `open` only returns once its
    /// token is cancelled
    pub fn push_stall(&self) {
        self.queue(Reply::Stall);
    }

    /// Queue a failure returned before any event
    pub fn push_failure(&self, status: u16, body: &str) {
        self.queue(Reply::Fail {
            status,
            body: body.to_string(),
        });
    }

    fn queue(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl AgentTransport for FakeTransport {
    async fn open(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| Error::InvalidOperation("fake transport lock poisoned".to_string()))?
            .pop_front();

        match reply {
            Some(Reply::Events(events)) => Ok(bounded(stream::iter(events), cancel)),
            Some(Reply::Live(rx)) => Ok(bounded(rx, cancel)),
            Some(Reply::Fail { status, body }) => Err(Error::Status { status, body }),
            Some(Reply::Stall) => {
                cancel.cancelled().await;
                Ok(Box::pin(stream::empty()))
            }
            None => Err(Error::InvalidOperation("no scripted reply queued".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
