use serde::{Deserialize, Serialize};

use crate::domain::{QueryResult, ToolCall};

/// Typed event decoded from one `data:` record of the agent stream.
///
/// Serialized form matches the wire: `{"type": "text", "content": "..."}`,
/// `{"type": "tool_calls", "data": [...]}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental assistant text
    #[serde(rename = "text")]
    TextDelta { content: String },

    /// Transient progress line ("Waiting for agent...")
    Status {
        #[serde(rename = "content")]
        message: String,
    },

    /// Batch of tool calls made during the turn
    ToolCalls {
        #[serde(rename = "data", default)]
        calls: Vec<ToolCall>,
    },

    /// Batch of structured query results
    #[serde(rename = "genie")]
    QueryResults {
        #[serde(rename = "data", default)]
        results: Vec<QueryResult>,
    },

    /// Agent-side failure reported inside the stream
    Error {
        #[serde(rename = "content", default)]
        message: String,
    },

    /// End of the turn
    Done,
}

impl StreamEvent {
    pub fn text(content: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            content: content.into(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        StreamEvent::Status {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }

    /// Wire tag of the event
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::TextDelta { .. } => "text",
            StreamEvent::Status { .. } => "status",
            StreamEvent::ToolCalls { .. } => "tool_calls",
            StreamEvent::QueryResults { .. } => "genie",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Done => "done",
        }
    }

    /// Encode as a single SSE record line (without trailing blank line)
    pub fn to_sse_line(&self) -> crate::Result<String> {
        Ok(format!("data: {}", serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_records() {
        let text: StreamEvent = serde_json::from_str(r#"{"type":"text","content":"EGFR is "}"#).unwrap();
        assert_eq!(text, StreamEvent::text("EGFR is "));

        let status: StreamEvent =
            serde_json::from_str(r#"{"type":"status","content":"Thinking"}"#).unwrap();
        assert_eq!(status, StreamEvent::status("Thinking"));

        let calls: StreamEvent = serde_json::from_str(
            r#"{"type":"tool_calls","data":[{"function_name":"search_entities","parameters":{"query":"EGFR"}}]}"#,
        )
        .unwrap();
        match calls {
            StreamEvent::ToolCalls { calls } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].function_name, "search_entities");
                assert_eq!(calls[0].parameters["query"], "EGFR");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let done: StreamEvent = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
        assert!(done.is_done());
    }

    #[test]
    fn test_decode_genie_batch() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"genie","data":[{"description":"count","query":"SELECT COUNT(*)","result":""}]}"#,
        )
        .unwrap();
        let StreamEvent::QueryResults { results } = event else {
            panic!("expected genie batch");
        };
        assert_eq!(results[0].description.as_deref(), Some("count"));
        assert_eq!(results[0].result, None);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"type":"heartbeat"}"#).is_err());
    }

    #[test]
    fn test_sse_line_encoding() {
        let line = StreamEvent::Done.to_sse_line().unwrap();
        assert_eq!(line, r#"data: {"type":"done"}"#);
        assert_eq!(StreamEvent::error("x").kind(), "error");
    }
}
