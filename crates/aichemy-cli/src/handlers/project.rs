use aichemy_runtime::store::resolve_id;
use aichemy_types::ProjectUpdate;
use anyhow::{Result, bail};

use crate::context::ExecutionContext;
use crate::views::{
    CommandResult, Guidance, ProjectActionView, ProjectDetailView, ProjectListView, render,
};

pub async fn list(ctx: &ExecutionContext) -> Result<()> {
    let store = ctx.store()?;
    let owner = ctx.owner()?;
    let summaries = store.list(&owner).await?;

    let view = ProjectListView::new(&owner, store.backend(), &summaries);
    let mut result = CommandResult::new(view);
    if summaries.is_empty() {
        result = result.with_suggestion(
            Guidance::new("Start chatting").with_command("aichemy chat"),
        );
    } else {
        result = result.with_suggestion(
            Guidance::new("Read a transcript").with_command("aichemy project show <ID>"),
        );
    }
    render(ctx.format, result)
}

pub async fn create(ctx: &ExecutionContext, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("project name cannot be empty");
    }
    let store = ctx.store()?;
    let project = store.create(name, &ctx.owner()?).await?;
    tracing::info!(project = %project.id, "created project");

    let chat = format!("aichemy chat --project {}", project.id);
    let view = ProjectActionView {
        action: "Created",
        id: project.id.to_string(),
        name: Some(project.name),
    };
    render(
        ctx.format,
        CommandResult::new(view).with_suggestion(Guidance::new("Chat in it").with_command(chat)),
    )
}

pub async fn show(ctx: &ExecutionContext, needle: &str) -> Result<()> {
    let project = ctx.resolve_project(Some(needle)).await?;
    let activity = format!("aichemy activity --project {}", project.id);
    let mut result = CommandResult::new(ProjectDetailView::from(project));
    if result.content.tool_call_groups + result.content.query_groups > 0 {
        result = result.with_suggestion(
            Guidance::new("See what the agent did").with_command(activity),
        );
    }
    render(ctx.format, result)
}

pub async fn rename(ctx: &ExecutionContext, needle: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("project name cannot be empty");
    }
    let store = ctx.store()?;
    let id = resolve_id(store.as_ref(), &ctx.owner()?, needle).await?;
    let project = store.save(&id, ProjectUpdate::rename(name)).await?;

    let view = ProjectActionView {
        action: "Renamed",
        id: project.id.to_string(),
        name: Some(project.name),
    };
    render(ctx.format, CommandResult::new(view))
}

pub async fn delete(ctx: &ExecutionContext, needle: &str) -> Result<()> {
    let store = ctx.store()?;
    let id = resolve_id(store.as_ref(), &ctx.owner()?, needle).await?;
    if !store.delete(&id).await? {
        bail!("project {} was already deleted", id);
    }
    tracing::info!(project = %id, "deleted project");

    let view = ProjectActionView {
        action: "Deleted",
        id: id.to_string(),
        name: None,
    };
    render(ctx.format, CommandResult::new(view))
}
