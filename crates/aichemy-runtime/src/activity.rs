//! Read models over a project's activity log, newest turn first.

use aichemy_types::{AgentSteps, QueryResult, ToolCall, truncate};
use serde::Serialize;
use serde_json::Value;

use crate::skills::extract_user_request;

pub const PROMPT_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityView {
    pub tool_groups: Vec<ToolGroupView>,
    pub query_groups: Vec<QueryGroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolGroupView {
    /// 1-based position of the group in chronological order
    pub seq: usize,
    pub prompt: String,
    pub calls: Vec<CallView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallView {
    pub number: usize,
    pub function_name: String,
    pub parameters: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryGroupView {
    pub seq: usize,
    pub prompt: String,
    pub results: Vec<QueryResult>,
}

/// Short single-sentence form of a turn's prompt
pub fn prompt_preview(prompt: &str) -> String {
    let request = extract_user_request(prompt);
    truncate(&aichemy_types::single_line(request), PROMPT_PREVIEW_CHARS)
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn call_view(number: usize, call: &ToolCall) -> CallView {
    CallView {
        number,
        function_name: call.function_name.clone(),
        parameters: call
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), param_text(v)))
            .collect(),
        rationale: call.rationale.clone().filter(|r| !r.trim().is_empty()),
    }
}

impl ActivityView {
    pub fn from_steps(steps: &AgentSteps) -> Self {
        let tool_groups = steps
            .tool_call_groups
            .iter()
            .enumerate()
            .rev()
            .map(|(i, group)| ToolGroupView {
                seq: i + 1,
                prompt: prompt_preview(&group.prompt),
                calls: group
                    .tool_calls
                    .iter()
                    .enumerate()
                    .map(|(n, call)| call_view(n + 1, call))
                    .collect(),
            })
            .collect();

        let query_groups = steps
            .query_groups
            .iter()
            .enumerate()
            .rev()
            .map(|(i, group)| QueryGroupView {
                seq: i + 1,
                prompt: prompt_preview(&group.prompt),
                results: group
                    .results
                    .iter()
                    .filter(|r| !r.is_blank())
                    .cloned()
                    .collect(),
            })
            .filter(|g| !g.results.is_empty())
            .collect();

        Self {
            tool_groups,
            query_groups,
        }
    }

    /// Keep only the `n` most recent groups of each kind
    pub fn latest(mut self, n: usize) -> Self {
        self.tool_groups.truncate(n);
        self.query_groups.truncate(n);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tool_groups.is_empty() && self.query_groups.is_empty()
    }

    pub fn call_count(&self) -> usize {
        self.tool_groups.iter().map(|g| g.calls.len()).sum()
    }
}
