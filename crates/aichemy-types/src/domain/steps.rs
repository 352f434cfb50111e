use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::util::lenient_text;

/// One tool invocation reported by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub function_name: String,
    /// Argument mapping in the order the agent emitted it
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Reasoning the agent attached to the call
    #[serde(
        default,
        rename = "thinking",
        alias = "rationale",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rationale: Option<String>,
}

impl ToolCall {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            parameters: Map::new(),
            rationale: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// Tool calls produced by a single prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallGroup {
    pub prompt: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// One structured-query answer (SQL assistant output)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl QueryResult {
    /// True when no field carries content
    pub fn is_blank(&self) -> bool {
        self.description.is_none() && self.query.is_none() && self.result.is_none()
    }
}

/// Query results produced by a single prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResultGroup {
    pub prompt: String,
    #[serde(default)]
    pub results: Vec<QueryResult>,
}

/// Activity log of a project
///
/// Persisted as `{"toolCallGroups": [...], "genieGroups": [...]}`. Older
/// records stored a bare list here; those decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSteps {
    pub tool_call_groups: Vec<ToolCallGroup>,
    #[serde(rename = "genieGroups")]
    pub query_groups: Vec<QueryResultGroup>,
}

impl AgentSteps {
    pub fn is_empty(&self) -> bool {
        self.tool_call_groups.is_empty() && self.query_groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.tool_call_groups.clear();
        self.query_groups.clear();
    }

    /// Total number of tool calls across all groups
    pub fn tool_call_count(&self) -> usize {
        self.tool_call_groups.iter().map(|g| g.tool_calls.len()).sum()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepsRecord {
    #[serde(default)]
    tool_call_groups: Vec<ToolCallGroup>,
    #[serde(default, alias = "queryGroups")]
    genie_groups: Vec<QueryResultGroup>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepsWire {
    Record(StepsRecord),
    Legacy(Vec<Value>),
}

impl<'de> Deserialize<'de> for AgentSteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StepsWire>::deserialize(deserializer)? {
            Some(StepsWire::Record(record)) => Ok(AgentSteps {
                tool_call_groups: record.tool_call_groups,
                query_groups: record.genie_groups,
            }),
            Some(StepsWire::Legacy(_)) | None => Ok(AgentSteps::default()),
        }
    }
}
