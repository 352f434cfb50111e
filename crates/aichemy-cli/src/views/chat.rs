use aichemy_types::{QueryResult, StreamEvent, ToolCall};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Writes a live turn to the terminal: reply text on stdout, progress on
/// stderr
pub struct StreamPrinter {
    color: bool,
    wrote_text: bool,
}

impl Default for StreamPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
            wrote_text: false,
        }
    }

    pub fn on_event(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { content } => {
                print!("{}", content);
                let _ = std::io::stdout().flush();
                self.wrote_text |= !content.is_empty();
            }
            StreamEvent::Status { message } => self.note(&format!("… {}", message)),
            StreamEvent::ToolCalls { calls } => {
                for call in calls {
                    self.note(&format!("🔧 {}", call.function_name));
                }
            }
            StreamEvent::QueryResults { results } => {
                for result in results.iter().filter(|r| !r.is_blank()) {
                    let label = result
                        .description
                        .as_deref()
                        .or(result.query.as_deref())
                        .unwrap_or("query");
                    self.note(&format!("SQL: {}", label));
                }
            }
            StreamEvent::Error { message } => {
                if self.color {
                    eprintln!("{} {}", "error:".red().bold(), message);
                } else {
                    eprintln!("error: {}", message);
                }
            }
            StreamEvent::Done => {}
        }
    }

    fn note(&self, line: &str) {
        if self.color {
            eprintln!("{}", line.dimmed());
        } else {
            eprintln!("{}", line);
        }
    }

    /// End the reply line
    pub fn finish(&mut self) {
        if self.wrote_text {
            println!();
            self.wrote_text = false;
        }
    }
}

/// Outcome of a one-shot turn
#[derive(Debug, Serialize)]
pub struct ChatReplyView {
    pub project_id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    pub reply: String,
    pub tool_calls: Vec<ToolCall>,
    pub query_results: Vec<QueryResult>,
    pub stopped: bool,
}

impl fmt::Display for ChatReplyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.reply)
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowPromptView {
    pub workflow: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

impl fmt::Display for WorkflowPromptView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.prompt)?;
        if let Some(skill) = &self.skill {
            writeln!(f, "(skill: {})", skill)?;
        }
        Ok(())
    }
}
