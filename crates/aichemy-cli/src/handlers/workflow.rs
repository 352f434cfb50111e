use aichemy_runtime::{PropertySet, Workflow, WorkflowSelection};
use anyhow::Result;

use crate::context::ExecutionContext;
use crate::views::{CommandResult, Guidance, WorkflowPromptView, render};

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    ctx: &ExecutionContext,
    workflow: Workflow,
    entity: &str,
    skills: bool,
    mut properties: Vec<PropertySet>,
    project: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let skills = skills || ctx.config()?.conversation.skills_enabled;
    if properties.is_empty() {
        properties.push(PropertySet::All);
    }

    let composed = WorkflowSelection::new(workflow, entity)
        .with_skills(skills)
        .with_properties(properties)
        .compose()?;
    tracing::debug!(workflow = %workflow, skill = ?composed.skill, "composed workflow prompt");

    if dry_run {
        let view = WorkflowPromptView {
            workflow: workflow.skill_name().to_string(),
            prompt: composed.prompt,
            skill: composed.skill,
        };
        let alias = workflow
            .skill_name()
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut command = format!("aichemy workflow {} \"{}\"", alias, entity.trim());
        if skills {
            command.push_str(" --skills");
        }
        let result = CommandResult::new(view)
            .with_suggestion(Guidance::new("Send it").with_command(command));
        return render(ctx.format, result);
    }

    super::chat::one_shot(ctx, project, &composed.prompt, composed.skill).await
}
