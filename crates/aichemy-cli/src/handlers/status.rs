use anyhow::Result;

use crate::context::ExecutionContext;
use crate::views::{CommandResult, HealthView, UserView, render};

pub async fn user(ctx: &ExecutionContext) -> Result<()> {
    let backend = ctx.backend()?;
    let user = backend.user().await?;
    let view = UserView {
        endpoint: backend.base_url().to_string(),
        user,
    };
    render(ctx.format, CommandResult::new(view))
}

pub async fn health(ctx: &ExecutionContext) -> Result<()> {
    let backend = ctx.backend()?;
    let health = backend.health().await?;
    if health.status != "healthy" {
        tracing::warn!(status = %health.status, "backend reports degraded health");
    }
    let view = HealthView {
        endpoint: backend.base_url().to_string(),
        health,
    };
    render(ctx.format, CommandResult::new(view))
}
