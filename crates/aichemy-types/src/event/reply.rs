use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{QueryResult, ToolCall};

/// Fallback assistant text when the agent answered with nothing usable
pub const EMPTY_REPLY_TEXT: &str = "No response. Retry or reset the chat.";

/// Response of the non-streaming agent endpoint.
///
/// `output` is the raw responses-API item list; `parsed` is present when the
/// proxy already extracted text and activity from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub databricks_output: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl OutputItem {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            content: vec![ContentPart {
                kind: "output_text".to_string(),
                text: Some(text.into()),
            }],
        }
    }

    /// Text of the first content part of a message item
    pub fn message_text(&self) -> Option<&str> {
        if self.kind != "message" {
            return None;
        }
        self.content
            .first()
            .and_then(|part| part.text.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Proxy-side extraction of an agent reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReply {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub genie: Vec<QueryResult>,
}
