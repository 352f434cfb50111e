//! Plain-text rendering of the list and activity views.

use aichemy::views::{ActivityReport, ProjectListView};
use aichemy_runtime::activity::ActivityView;
use aichemy_types::{
    AgentSteps, ProjectId, ProjectSummary, QueryResult, QueryResultGroup, ToolCall, ToolCallGroup,
};
use chrono::{TimeZone, Utc};
use serde_json::json;

fn steps() -> AgentSteps {
    AgentSteps {
        tool_call_groups: vec![
            ToolCallGroup {
                prompt: "What diseases are associated with EGFR".into(),
                tool_calls: vec![
                    ToolCall::new("search_entities")
                        .with_param("query", json!("EGFR"))
                        .with_rationale("Look up the target first"),
                ],
            },
            ToolCallGroup {
                prompt: "You have been given a specialized skill.\n\n\
                         <skill_instructions>\n# Skill: hit-identification\n</skill_instructions>\n\n\
                         <user_request>\nFind drugs associated with BRCA1.\n</user_request>"
                    .into(),
                tool_calls: vec![
                    ToolCall::new("get_associations")
                        .with_param("target_id", json!("ENSG00000012048"))
                        .with_param("size", json!(5)),
                ],
            },
        ],
        query_groups: vec![QueryResultGroup {
            prompt: "List all the drugs in the GLP-1 agonists ATC class in DrugBank".into(),
            results: vec![
                QueryResult::default(),
                QueryResult {
                    description: Some("Drugs in ATC class A10BJ".into()),
                    query: Some("SELECT name\nFROM drugbank.drugs\nWHERE atc = 'A10BJ'".into()),
                    result: None,
                },
            ],
        }],
    }
}

#[test]
fn test_activity_report_plain() {
    let report = ActivityReport {
        project_id: "p-1".into(),
        project_name: "Kinase notes".into(),
        activity: ActivityView::from_steps(&steps()),
    };
    insta::assert_snapshot!("activity_report", report.to_string());
}

#[test]
fn test_activity_report_empty() {
    let report = ActivityReport {
        project_id: "p-1".into(),
        project_name: "Untitled".into(),
        activity: ActivityView::from_steps(&AgentSteps::default()),
    };
    insta::assert_snapshot!("activity_report_empty", report.to_string());
}

#[test]
fn test_project_list_plain() {
    let at = |h| Utc.with_ymd_and_hms(2025, 1, 15, h, 30, 0).unwrap();
    let summaries = vec![
        ProjectSummary {
            id: ProjectId::new("a1b2c3d4-5e6f-4a7b-8c9d-0e1f2a3b4c5d"),
            name: "EGFR notes".into(),
            created_at: at(9),
            updated_at: at(11),
        },
        ProjectSummary {
            id: ProjectId::new("f0e1d2c3-b4a5-4968-8776-655443322110"),
            name: "Untitled".into(),
            created_at: at(8),
            updated_at: at(9),
        },
    ];
    let view = ProjectListView::new("local", "sqlite", &summaries);
    insta::assert_snapshot!("project_list", view.to_string());
}
