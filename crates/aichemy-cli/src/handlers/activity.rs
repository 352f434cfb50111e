use aichemy_runtime::activity::ActivityView;
use anyhow::Result;

use crate::context::ExecutionContext;
use crate::views::{ActivityReport, CommandResult, Guidance, render};

pub async fn handle(ctx: &ExecutionContext, project: Option<&str>, limit: usize) -> Result<()> {
    let project = ctx.resolve_project(project).await?;
    let activity = ActivityView::from_steps(&project.agent_steps).latest(limit);

    let empty = activity.is_empty();
    let report = ActivityReport {
        project_id: project.id.to_string(),
        project_name: project.name,
        activity,
    };

    let mut result = CommandResult::new(report);
    if empty {
        result = result.with_suggestion(
            Guidance::new("Ask something that needs the agent's tools")
                .with_command("aichemy chat --example 2"),
        );
    }
    render(ctx.format, result)
}
