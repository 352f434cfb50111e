//! Normalisation of non-streaming agent replies.
//!
//! The blocking endpoint returns raw responses-API output. Tool calls are
//! embedded as XML-ish tags inside the message text and structured query
//! results only appear in trace spans, so both are recovered here and the
//! reply is turned into the same event sequence the stream would produce.

use aichemy_types::{
    AgentReply, EMPTY_REPLY_TEXT, ParsedReply, QueryResult, StreamEvent, ToolCall,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static FUNCTION_CALLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<function_calls>\s*(.*?)\s*</function_calls>").unwrap()
});
static THINKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<thinking>\s*(.*?)\s*</thinking>").unwrap());
static INVOKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<invoke name="([^"]+)">\s*(.*?)\s*</invoke>"#).unwrap()
});
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<parameter name="([^"]+)">([^<]*)</parameter>"#).unwrap()
});
static STRIP_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<function_calls>.*?</function_calls>|<thinking>.*?</thinking>|<results>.*?</results>",
    )
    .unwrap()
});
static UNCLOSED_RESULTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<results>.*").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

const QUERY_SPAN: &str = "poll_query_results";

/// Extract tool invocations from message text.
///
/// `<thinking>` blocks are paired with calls by position.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    for block in FUNCTION_CALLS.captures_iter(text) {
        for invoke in INVOKE.captures_iter(&block[1]) {
            let mut parameters = Map::new();
            for param in PARAMETER.captures_iter(&invoke[2]) {
                parameters.insert(
                    param[1].to_string(),
                    Value::String(param[2].trim().to_string()),
                );
            }
            calls.push(ToolCall {
                function_name: invoke[1].to_string(),
                parameters,
                rationale: None,
            });
        }
    }

    for (call, thinking) in calls.iter_mut().zip(THINKING.captures_iter(text)) {
        call.rationale = Some(thinking[1].trim().to_string());
    }
    calls
}

/// Remove tool-call, thinking and results blocks and squeeze blank lines
pub fn strip_tool_call_tags(text: &str) -> String {
    let text = STRIP_BLOCKS.replace_all(text, "");
    let text = UNCLOSED_RESULTS.replace_all(&text, "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Collect query results from `poll_query_results` trace spans.
///
/// The span output is a JSON string that itself encodes a JSON string.
pub fn parse_query_results(databricks_output: &Value) -> Vec<QueryResult> {
    let Some(spans) = databricks_output
        .pointer("/trace/data/spans")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    spans
        .iter()
        .filter(|span| span.get("name").and_then(Value::as_str) == Some(QUERY_SPAN))
        .filter_map(|span| {
            let raw = span
                .pointer("/attributes/mlflow.spanOutputs")
                .and_then(Value::as_str)?;
            match decode_span_output(raw) {
                Some(result) => Some(result),
                None => {
                    tracing::debug!("skipping undecodable query span output");
                    None
                }
            }
        })
        .collect()
}

fn decode_span_output(raw: &str) -> Option<QueryResult> {
    let inner: String = serde_json::from_str(raw).ok()?;
    serde_json::from_str(&inner).ok()
}

/// Pick the proxy's own extraction when present, otherwise parse `output`.
///
/// Display text is the last message item (the supervisor summary); tool
/// calls come from every message item.
pub fn normalize(reply: AgentReply) -> ParsedReply {
    if let Some(parsed) = reply.parsed {
        return parsed;
    }

    let texts: Vec<&str> = reply
        .output
        .iter()
        .filter_map(|item| item.message_text())
        .collect();

    let tool_calls = texts.iter().flat_map(|text| parse_tool_calls(text)).collect();
    let text = texts
        .last()
        .map(|text| strip_tool_call_tags(text))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY_TEXT.to_string());
    let genie = reply
        .databricks_output
        .as_ref()
        .map(parse_query_results)
        .unwrap_or_default();

    ParsedReply {
        text,
        tool_calls,
        genie,
    }
}

/// Replay a blocking reply as the events a streaming reply would carry
pub fn into_events(reply: AgentReply) -> Vec<StreamEvent> {
    let parsed = normalize(reply);
    let mut events = Vec::with_capacity(4);

    if !parsed.text.is_empty() {
        events.push(StreamEvent::text(parsed.text));
    }
    if !parsed.tool_calls.is_empty() {
        events.push(StreamEvent::ToolCalls {
            calls: parsed.tool_calls,
        });
    }
    if !parsed.genie.is_empty() {
        events.push(StreamEvent::QueryResults {
            results: parsed.genie,
        });
    }
    events.push(StreamEvent::Done);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use aichemy_types::OutputItem;
    use serde_json::json;

    const SUPERVISOR_TEXT: &str = r#"<thinking>I should look up EGFR first.</thinking>
<function_calls>
<invoke name="search_entities">
<parameter name="query_string"> EGFR </parameter>
<parameter name="entity_type">target</parameter>
</invoke>
</function_calls>
<results>ignored</results>


EGFR is associated with lung cancer.



It is also linked to glioblastoma."#;

    #[test]
    fn test_parse_tool_calls_with_thinking() {
        let calls = parse_tool_calls(SUPERVISOR_TEXT);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function_name, "search_entities");
        let keys: Vec<_> = calls[0].parameters.keys().cloned().collect();
        assert_eq!(keys, vec!["query_string", "entity_type"]);
        assert_eq!(calls[0].parameters["query_string"], "EGFR");
        assert_eq!(calls[0].rationale.as_deref(), Some("I should look up EGFR first."));
    }

    #[test]
    fn test_extra_thinking_blocks_are_ignored() {
        let text = "<thinking>a</thinking><thinking>b</thinking>";
        assert!(parse_tool_calls(text).is_empty());
    }

    #[test]
    fn test_strip_tags_and_collapse_blank_lines() {
        let cleaned = strip_tool_call_tags(SUPERVISOR_TEXT);
        assert_eq!(
            cleaned,
            "EGFR is associated with lung cancer.\n\nIt is also linked to glioblastoma."
        );
        assert_eq!(strip_tool_call_tags("answer <results>partial"), "answer");
    }

    #[test]
    fn test_query_results_from_trace_spans() {
        let inner = json!({"result": "| n |\n| 4 |", "query": "SELECT COUNT(*) FROM drugs", "description": "Count drugs"});
        let once = serde_json::to_string(&inner.to_string()).unwrap();
        let output = json!({
            "trace": {"data": {"spans": [
                {"name": "other", "attributes": {}},
                {"name": "poll_query_results", "attributes": {"mlflow.spanOutputs": once}},
                {"name": "poll_query_results", "attributes": {"mlflow.spanOutputs": "not json"}}
            ]}}
        });

        let results = parse_query_results(&output);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].query.as_deref(), Some("SELECT COUNT(*) FROM drugs"));
        assert_eq!(results[0].description.as_deref(), Some("Count drugs"));
    }

    #[test]
    fn test_normalize_prefers_parsed_section() {
        let reply = AgentReply {
            output: vec![OutputItem::message("raw")],
            parsed: Some(ParsedReply {
                text: "clean".into(),
                tool_calls: vec![],
                genie: vec![],
            }),
            databricks_output: None,
        };
        assert_eq!(normalize(reply).text, "clean");
    }

    #[test]
    fn test_normalize_uses_last_message_for_text_and_all_for_calls() {
        let reply = AgentReply {
            output: vec![
                OutputItem::message(
                    "<function_calls><invoke name=\"a\"></invoke></function_calls>sub-agent notes",
                ),
                OutputItem::message(
                    "<function_calls><invoke name=\"b\"></invoke></function_calls>Final answer",
                ),
            ],
            parsed: None,
            databricks_output: None,
        };
        let parsed = normalize(reply);
        assert_eq!(parsed.text, "Final answer");
        let names: Vec<_> = parsed.tool_calls.iter().map(|c| c.function_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_reply_gets_fallback_text() {
        let events = into_events(AgentReply::default());
        assert_eq!(events, vec![StreamEvent::text(EMPTY_REPLY_TEXT), StreamEvent::Done]);
    }
}
