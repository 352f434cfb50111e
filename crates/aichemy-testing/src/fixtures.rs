//! Canned agent replies and projects.

use aichemy_types::{AgentSteps, Message, Project, ProjectId, StreamEvent, ToolCall};
use chrono::{TimeZone, Utc};
use serde_json::json;

pub const EGFR_PROMPT: &str = "What diseases are associated with EGFR";

/// Reply to [`EGFR_PROMPT`]: status, two text deltas, one tool call, done
pub fn egfr_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::status("Thinking"),
        StreamEvent::text("EGFR is "),
        StreamEvent::text("linked to..."),
        StreamEvent::ToolCalls {
            calls: vec![ToolCall::new("search_entities").with_param("query", json!("EGFR"))],
        },
        StreamEvent::Done,
    ]
}

/// Encode events as the proxy's SSE body
pub fn sse_body(events: &[StreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| e.to_sse_line().ok())
        .map(|line| format!("{}\n\n", line))
        .collect()
}

/// An empty project with fixed timestamps
pub fn empty_project(id: &str, name: &str) -> Project {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).single().unwrap_or_default();
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        messages: Vec::new(),
        agent_steps: AgentSteps::default(),
        created_at: at,
        updated_at: at,
    }
}

/// A project holding one finished exchange
pub fn project_with_history(id: &str) -> Project {
    let mut project = empty_project(id, "EGFR review");
    project.messages = vec![
        Message::user(EGFR_PROMPT),
        Message::assistant("EGFR is linked to lung cancer."),
    ];
    project
}
