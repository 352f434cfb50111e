use aichemy_runtime::Config;
use anyhow::{Result, bail};

use crate::context::ExecutionContext;
use crate::views::{CommandResult, ConfigView, Guidance, render};

const REDACTED: &str = "********";

pub fn show(ctx: &ExecutionContext) -> Result<()> {
    let path = ctx.config_path();
    let mut config = ctx.config()?.clone();
    if config.endpoint.token.is_some() {
        config.endpoint.token = Some(REDACTED.to_string());
    }

    let view = ConfigView {
        path: path.display().to_string(),
        exists: path.exists(),
        config,
    };
    let mut result = CommandResult::new(view);
    if !result.content.exists {
        result = result
            .with_suggestion(Guidance::new("Write it to disk").with_command("aichemy config init"));
    }
    render(ctx.format, result)
}

pub fn init(ctx: &ExecutionContext, force: bool) -> Result<()> {
    let path = ctx.config_path();
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config::default();
    config.save_to(&path)?;
    tracing::info!(path = %path.display(), "wrote default configuration");

    render(
        ctx.format,
        CommandResult::new(ConfigView {
            path: path.display().to_string(),
            exists: true,
            config,
        }),
    )
}
