//! View models for command output. Each implements `Display` for plain
//! output and `Serialize` for `--format json`.

mod activity;
mod catalog;
mod chat;
mod project;
mod status;

pub use activity::ActivityReport;
pub use catalog::{ExampleListView, SkillDetailView, SkillListView, ToolListView};
pub use chat::{ChatReplyView, StreamPrinter, WorkflowPromptView};
pub use project::{ProjectActionView, ProjectDetailView, ProjectListView};
pub use status::{ConfigView, HealthView, UserView};

use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::Display;

use crate::types::OutputFormat;

/// A follow-up command worth suggesting
#[derive(Debug, Clone, Serialize)]
pub struct Guidance {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Guidance {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T: Serialize> {
    pub content: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Guidance>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, guide: Guidance) -> Self {
        self.suggestions.push(guide);
        self
    }
}

pub fn render<T>(format: OutputFormat, result: CommandResult<T>) -> Result<()>
where
    T: Serialize + Display,
{
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print!("{}", result.content);

    if !result.suggestions.is_empty() {
        let color = std::io::stdout().is_terminal();
        if color {
            println!("\n{}", "Tips:".yellow().bold());
        } else {
            println!("\nTips:");
        }
        for tip in &result.suggestions {
            print!("  • {}", tip.description);
            if let Some(cmd) = &tip.command {
                if color {
                    print!(": {}", cmd.cyan());
                } else {
                    print!(": {}", cmd);
                }
            }
            println!();
        }
    }
    Ok(())
}
