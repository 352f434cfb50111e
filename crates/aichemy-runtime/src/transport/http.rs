use aichemy_types::{AgentReply, AgentRequest, StreamEvent};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

use super::sse::SseDecoder;
use super::{AgentTransport, EventStream, bounded, reply};
use crate::config::EndpointConfig;
use crate::{Error, Result};

/// Transport talking to the agent proxy over HTTP
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    stream_url: String,
    invoke_url: String,
    token: Option<String>,
    streaming: bool,
}

impl HttpTransport {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aichemy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: &EndpointConfig) -> Self {
        let base = endpoint.base_url.trim_end_matches('/');
        Self {
            client,
            stream_url: format!("{}{}", base, endpoint.stream_path),
            invoke_url: format!("{}{}", base, endpoint.invoke_path),
            token: endpoint.token.clone(),
            streaming: endpoint.streaming,
        }
    }

    fn post(&self, url: &str, request: &AgentRequest) -> reqwest::RequestBuilder {
        let builder = self.client.post(url).json(request);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn open_stream(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream> {
        let send = self
            .post(&self.stream_url, request)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send();
        let response = tokio::select! {
            response = send => response?,
            () = cancel.cancelled() => {
                tracing::debug!("agent stream cancelled while connecting");
                return Ok(Box::pin(stream::empty()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(thread_id = request.thread_id(), "agent stream opened");
        let state = ReadState {
            body: response.bytes_stream().boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            exhausted: false,
        };
        Ok(bounded(stream::unfold(state, ReadState::next_event), cancel))
    }

    async fn invoke(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream> {
        let call = async {
            let response = self.post(&self.invoke_url, request).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok::<_, Error>(response.json::<AgentReply>().await?)
        };

        let reply = tokio::select! {
            reply = call => reply?,
            () = cancel.cancelled() => {
                tracing::debug!("agent call cancelled before reply");
                return Ok(Box::pin(stream::empty()));
            }
        };

        let events = reply::into_events(reply);
        Ok(bounded(stream::iter(events), cancel))
    }
}

struct ReadState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    exhausted: bool,
}

impl ReadState {
    async fn next_event(mut self) -> Option<(StreamEvent, Self)> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some((event, self));
            }
            if self.exhausted {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    let events = self.decoder.push(&chunk);
                    self.pending.extend(events);
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "agent stream read failed");
                    self.exhausted = true;
                    self.pending
                        .push_back(StreamEvent::error(format!("stream interrupted: {}", e)));
                }
                None => {
                    self.exhausted = true;
                    if let Some(event) = self.decoder.finish() {
                        self.pending.push_back(event);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn open(&self, request: &AgentRequest, cancel: CancellationToken) -> Result<EventStream> {
        if self.streaming {
            self.open_stream(request, cancel).await
        } else {
            self.invoke(request, cancel).await
        }
    }

    fn name(&self) -> &'static str {
        if self.streaming { "http-stream" } else { "http" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_without_double_slash() {
        let endpoint = EndpointConfig {
            base_url: "http://agent.local:8000/".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::with_client(reqwest::Client::new(), &endpoint);
        assert_eq!(transport.stream_url, "http://agent.local:8000/api/agent/stream");
        assert_eq!(transport.invoke_url, "http://agent.local:8000/api/agent");
        assert_eq!(transport.name(), "http-stream");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_before_any_event() {
        let endpoint = EndpointConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::with_client(reqwest::Client::new(), &endpoint);
        let request = AgentRequest::new(
            vec![aichemy_types::Message::user("hi")],
            &aichemy_types::ProjectId::new("t"),
        );

        let result = transport.open(&request, CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
