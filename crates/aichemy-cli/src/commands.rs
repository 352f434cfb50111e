use super::args::{Cli, Commands, ConfigCommand, ProjectCommand, SkillsCommand};
use super::context::ExecutionContext;
use super::handlers;
use crate::types::LogLevel;
use aichemy_runtime::examples::{EXAMPLE_QUESTIONS, example_question};
use aichemy_runtime::resolve_data_dir;
use anyhow::{Result, anyhow};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;

    let Some(command) = cli.command else {
        show_guidance(&data_dir);
        return Ok(());
    };

    let ctx = ExecutionContext::new(data_dir, cli.format, cli.endpoint, cli.mock);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&ctx, command))
}

/// Diagnostics go to stderr so stdout stays clean for replies and JSON.
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "aichemy={level},aichemy_runtime={level},aichemy_index={level}"
            ))
        });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(ctx: &ExecutionContext, command: Commands) -> Result<()> {
    match command {
        Commands::Chat {
            project,
            prompt,
            example,
            skill,
        } => {
            let prompt = match (prompt, example) {
                (Some(prompt), _) => Some(prompt),
                (None, Some(number)) => Some(
                    example_question(number)
                        .ok_or_else(|| {
                            anyhow!(
                                "no example question #{} (choose 1-{})",
                                number,
                                EXAMPLE_QUESTIONS.len()
                            )
                        })?
                        .to_string(),
                ),
                (None, None) => None,
            };

            match prompt {
                Some(prompt) => {
                    handlers::chat::one_shot(ctx, project.as_deref(), &prompt, skill).await
                }
                None => handlers::chat::interactive(ctx, project.as_deref()).await,
            }
        }

        Commands::Workflow {
            workflow,
            entity,
            skills,
            properties,
            project,
            dry_run,
        } => {
            handlers::workflow::handle(
                ctx,
                workflow.into(),
                &entity.join(" "),
                skills,
                properties.into_iter().map(Into::into).collect(),
                project.as_deref(),
                dry_run,
            )
            .await
        }

        Commands::Project { command } => match command {
            ProjectCommand::List => handlers::project::list(ctx).await,
            ProjectCommand::Create { name } => handlers::project::create(ctx, &name).await,
            ProjectCommand::Show { id } => handlers::project::show(ctx, &id).await,
            ProjectCommand::Rename { id, name } => {
                handlers::project::rename(ctx, &id, &name).await
            }
            ProjectCommand::Delete { id } => handlers::project::delete(ctx, &id).await,
        },

        Commands::Activity { project, limit } => {
            handlers::activity::handle(ctx, project.as_deref(), limit).await
        }

        Commands::Skills { command } => match command {
            SkillsCommand::List { remote } => handlers::catalog::skills(ctx, remote).await,
            SkillsCommand::Show { name, wrap } => {
                handlers::catalog::skill_show(ctx, &name, wrap.as_deref())
            }
        },

        Commands::Tools { remote } => handlers::catalog::tools(ctx, remote).await,

        Commands::Examples => handlers::catalog::examples(ctx),

        Commands::User => handlers::status::user(ctx).await,

        Commands::Health => handlers::status::health(ctx).await,

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(ctx),
            ConfigCommand::Init { force } => handlers::config::init(ctx, force),
        },
    }
}

fn show_guidance(data_dir: &Path) {
    println!("aichemy - Chat with the AiChemy chemistry agent\n");

    if !data_dir.join("config.toml").exists() {
        println!("Get started:");
        println!("  aichemy config init               # Write a default config.toml");
        println!("  aichemy health                    # Check the agent proxy\n");
    }

    println!("Quick commands:");
    println!("  aichemy chat                      # Interactive chat in the latest project");
    println!("  aichemy chat --example 2          # Ask an example question");
    println!("  aichemy workflow target EGFR      # Guided drug-discovery workflow");
    println!("  aichemy activity                  # Tool calls and SQL of the latest project\n");

    println!("For more commands:");
    println!("  aichemy --help");
}
