use aichemy_runtime::examples::EXAMPLE_QUESTIONS;
use aichemy_runtime::skills::{build_prompt_with_skill, discover, load_skill_content};
use aichemy_runtime::tools::load_tools;
use anyhow::{Result, anyhow};

use crate::context::ExecutionContext;
use crate::views::{
    CommandResult, ExampleListView, Guidance, SkillDetailView, SkillListView, ToolListView,
    render,
};

pub async fn skills(ctx: &ExecutionContext, remote: bool) -> Result<()> {
    let (source, catalog) = if remote {
        let backend = ctx.backend()?;
        (backend.base_url().to_string(), backend.skills().await?)
    } else {
        let dir = ctx.skills_dir()?;
        (dir.display().to_string(), discover(&dir))
    };

    let mut result = CommandResult::new(SkillListView {
        source,
        skills: catalog.skills,
    });
    if !result.content.skills.is_empty() {
        result = result.with_suggestion(
            Guidance::new("Use a skill in a workflow")
                .with_command("aichemy workflow target \"breast cancer\" --skills"),
        );
    }
    render(ctx.format, result)
}

pub fn skill_show(ctx: &ExecutionContext, name: &str, wrap: Option<&str>) -> Result<()> {
    let dir = ctx.skills_dir()?;
    let skill = load_skill_content(&dir, name)?
        .ok_or_else(|| anyhow!("skill '{}' not found in {}", name, dir.display()))?;

    let prompt = match wrap {
        Some(query) => build_prompt_with_skill(query, name, &dir),
        None => skill.full_prompt(),
    };
    render(
        ctx.format,
        CommandResult::new(SkillDetailView {
            name: skill.name,
            prompt,
        }),
    )
}

pub async fn tools(ctx: &ExecutionContext, remote: bool) -> Result<()> {
    let (source, catalog) = if remote {
        let backend = ctx.backend()?;
        (backend.base_url().to_string(), backend.tools().await?)
    } else {
        let path = ctx.tools_path()?;
        (path.display().to_string(), load_tools(&path)?)
    };

    render(
        ctx.format,
        CommandResult::new(ToolListView {
            source,
            tools: catalog,
        }),
    )
}

pub fn examples(ctx: &ExecutionContext) -> Result<()> {
    let view = ExampleListView {
        examples: EXAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    };
    render(
        ctx.format,
        CommandResult::new(view)
            .with_suggestion(Guidance::new("Ask one").with_command("aichemy chat --example 1")),
    )
}
