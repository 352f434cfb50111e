//! HttpTransport against a one-shot canned HTTP server on localhost.

use aichemy_runtime::config::EndpointConfig;
use aichemy_runtime::{AgentTransport, Error, HttpTransport};
use aichemy_testing::fixtures::{egfr_events, sse_body};
use aichemy_types::{AgentRequest, Message, ProjectId, StreamEvent};
use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Serve one response, writing the body in `chunk`-byte pieces. Resolves to
/// the raw request text.
async fn serve_once(
    status: &str,
    content_type: &str,
    body: String,
    chunk: usize,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let head = format!(
        "HTTP/1.1 {}\r\ncontent-type: {}\r\nconnection: close\r\n\r\n",
        status, content_type
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(head.as_bytes()).await.unwrap();
        for piece in body.as_bytes().chunks(chunk) {
            socket.write_all(piece).await.unwrap();
            socket.flush().await.unwrap();
        }
        socket.shutdown().await.ok();
        let _ = tx.send(request);
    });
    (base_url, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        raw.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let length = text[..split]
                .lines()
                .find_map(|l| {
                    let lower = l.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if raw.len() >= split + 4 + length {
                return text;
            }
        }
        if n == 0 {
            return String::from_utf8_lossy(&raw).to_string();
        }
    }
}

fn endpoint(base_url: String, streaming: bool) -> EndpointConfig {
    EndpointConfig {
        base_url,
        token: Some("secret".into()),
        streaming,
        ..Default::default()
    }
}

fn request() -> AgentRequest {
    AgentRequest::new(
        vec![Message::user("What diseases are associated with EGFR")],
        &ProjectId::new("thread-7"),
    )
    .with_skill(Some("target-identification".into()))
}

#[tokio::test]
async fn test_stream_decodes_split_records_and_drops_malformed() {
    let mut body = String::from(": keep-alive\n\ndata: {not json}\n\n");
    body.push_str(&sse_body(&egfr_events()));
    let (base_url, seen) = serve_once("200 OK", "text/event-stream", body, 7).await;

    let transport = HttpTransport::new(&endpoint(base_url, true)).unwrap();
    let events: Vec<StreamEvent> = transport
        .open(&request(), CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(events, egfr_events());

    let raw = seen.await.unwrap();
    assert!(raw.starts_with("POST /api/agent/stream "));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer secret"));
    assert!(raw.contains(r#""thread_id":"thread-7""#));
    assert!(raw.contains(r#""skill_name":"target-identification""#));
}

#[tokio::test]
async fn test_non_success_status_fails_before_events() {
    let (base_url, _seen) = serve_once(
        "500 Internal Server Error",
        "application/json",
        r#"{"detail":"agent unavailable"}"#.to_string(),
        64,
    )
    .await;

    let transport = HttpTransport::new(&endpoint(base_url, true)).unwrap();
    let err = transport
        .open(&request(), CancellationToken::new())
        .await
        .err()
        .unwrap();
    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("agent unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_invoke_normalises_parsed_reply() {
    let reply = serde_json::json!({
        "output": [],
        "parsed": {
            "text": "EGFR is linked to lung cancer.",
            "tool_calls": [{"function_name": "search_entities", "parameters": {"query": "EGFR"}, "thinking": ""}],
            "genie": []
        }
    });
    let (base_url, seen) = serve_once("200 OK", "application/json", reply.to_string(), 4096).await;

    let transport = HttpTransport::new(&endpoint(base_url, false)).unwrap();
    assert_eq!(transport.name(), "http");
    let events: Vec<StreamEvent> = transport
        .open(&request(), CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.first(), Some(&StreamEvent::text("EGFR is linked to lung cancer.")));
    assert!(matches!(&events[1], StreamEvent::ToolCalls { calls } if calls.len() == 1));
    assert_eq!(events.last(), Some(&StreamEvent::Done));
    assert!(seen.await.unwrap().starts_with("POST /api/agent "));
}

/// Accept one connection, read the request and never answer
async fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });
    base_url
}

async fn assert_cancel_while_connecting_ends_open(streaming: bool) {
    let base_url = serve_silently().await;
    let transport = HttpTransport::new(&endpoint(base_url, streaming)).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let opened = tokio::time::timeout(Duration::from_secs(2), transport.open(&request(), cancel))
        .await
        .expect("open should return once the token is cancelled");
    let events: Vec<StreamEvent> = opened.unwrap().collect().await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_cancel_while_stream_connects_returns_empty_stream() {
    assert_cancel_while_connecting_ends_open(true).await;
}

#[tokio::test]
async fn test_cancel_while_invoke_waits_returns_empty_stream() {
    assert_cancel_while_connecting_ends_open(false).await;
}
