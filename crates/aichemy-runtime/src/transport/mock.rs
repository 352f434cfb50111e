use aichemy_types::{AgentRequest, StreamEvent};
use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{AgentTransport, EventStream, bounded};
use crate::Result;

/// Offline agent that echoes the last user message word by word
#[derive(Debug, Clone)]
pub struct MockTransport {
    delay: Duration,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(50),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between words; zero streams everything at once
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn reply_text(request: &AgentRequest) -> String {
        let asked = request.last_user_text().unwrap_or_default();
        format!(
            "[mock] You asked: \"{}\". This is a streaming mock response.",
            asked
        )
    }

    fn script(request: &AgentRequest) -> VecDeque<StreamEvent> {
        let text = Self::reply_text(request);
        text.split_whitespace()
            .map(|word| StreamEvent::text(format!("{} ", word)))
            .chain(std::iter::once(StreamEvent::Done))
            .collect()
    }
}

#[async_trait]
impl AgentTransport for MockTransport {
    async fn open(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream> {
        let delay = self.delay;
        let script = Self::script(request);
        tracing::debug!(events = script.len(), "mock agent reply prepared");

        let events = stream::unfold((script, true), move |(mut script, first)| async move {
            let event = script.pop_front()?;
            if !first && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some((event, (script, false)))
        });
        Ok(bounded(events, cancel))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aichemy_types::{Message, ProjectId};
    use futures::StreamExt;

    fn request(text: &str) -> AgentRequest {
        AgentRequest::new(vec![Message::user(text)], &ProjectId::new("t"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_echoes_prompt_then_done() {
        let transport = MockTransport::new();
        let events: Vec<_> = transport
            .open(&request("hello there"), CancellationToken::new())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(events.last(), Some(&StreamEvent::Done));
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            text.trim_end(),
            "[mock] You asked: \"hello there\". This is a streaming mock response."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let mut events = MockTransport::new()
            .open(&request("q"), cancel.clone())
            .await
            .unwrap();

        assert!(events.next().await.is_some());
        cancel.cancel();
        assert!(events.next().await.is_none());
    }
}
