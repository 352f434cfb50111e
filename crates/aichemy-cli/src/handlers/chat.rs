use aichemy_runtime::activity::ActivityView;
use aichemy_runtime::examples::{EXAMPLE_QUESTIONS, example_question};
use aichemy_runtime::store::resolve_id;
use aichemy_runtime::{
    Conversation, ProjectStore, PropertySet, Workflow, WorkflowSelection,
};
use aichemy_types::{Project, ProjectUpdate};
use anyhow::{Result, anyhow};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::context::{DEFAULT_PROJECT_NAME, ExecutionContext};
use crate::views::{
    ActivityReport, ChatReplyView, CommandResult, ExampleListView, ProjectListView,
    StreamPrinter, render,
};

/// Routes Ctrl-C: cancels the turn in flight, or asks the prompt loop to
/// quit when idle. The token stays armed until the turn is over, so a
/// repeated press while a reply is pending never turns into a quit.
#[derive(Clone, Default)]
struct Interrupt {
    active: Arc<Mutex<Option<CancellationToken>>>,
    quit: Arc<Notify>,
}

impl Interrupt {
    fn install() -> Result<Self> {
        let interrupt = Self::default();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.on_signal())?;
        Ok(interrupt)
    }

    fn on_signal(&self) {
        let active = self.active.lock().ok().and_then(|slot| slot.clone());
        match active {
            Some(token) => token.cancel(),
            None => self.quit.notify_one(),
        }
    }

    fn arm(&self, token: CancellationToken) {
        if let Ok(mut slot) = self.active.lock() {
            *slot = Some(token);
        }
    }

    fn disarm(&self) {
        if let Ok(mut slot) = self.active.lock() {
            slot.take();
        }
    }
}

struct TurnOutcome {
    stopped: bool,
}

/// Submit `prompt` and drive the turn to its end. A transport failure has
/// already been written into the transcript when this returns `Err`.
async fn send(
    conv: &mut Conversation,
    prompt: &str,
    skill: Option<String>,
    interrupt: &Interrupt,
    echo: bool,
) -> Result<Option<TurnOutcome>> {
    let cancel = CancellationToken::new();
    interrupt.arm(cancel.clone());
    let submitted = conv.submit_with_cancel(prompt, skill, cancel.clone()).await;
    let turn = match submitted {
        Ok(Some(turn)) => turn,
        Ok(None) => {
            interrupt.disarm();
            return Ok(None);
        }
        Err(e) => {
            interrupt.disarm();
            return Err(e.into());
        }
    };

    let mut printer = StreamPrinter::new();
    conv.drive_with(turn, |event| {
        if echo {
            printer.on_event(event);
        }
    })
    .await;
    interrupt.disarm();
    printer.finish();

    let stopped = cancel.is_cancelled();
    if stopped && echo {
        eprintln!("(stopped)");
    }
    Ok(Some(TurnOutcome { stopped }))
}

fn open_conversation(ctx: &ExecutionContext, project: &Project) -> Result<Conversation> {
    let config = ctx.config()?;
    Ok(Conversation::new(
        project,
        ctx.transport()?,
        ctx.store()?,
        config.autosave_delay(),
    ))
}

/// Send one prompt, print the reply and persist the transcript
pub async fn one_shot(
    ctx: &ExecutionContext,
    project: Option<&str>,
    prompt: &str,
    skill: Option<String>,
) -> Result<()> {
    let project = ctx.resolve_project(project).await?;
    let mut conv = open_conversation(ctx, &project)?;
    let interrupt = Interrupt::install()?;

    let tools_before = conv.steps().tool_call_groups.len();
    let queries_before = conv.steps().query_groups.len();
    let outcome = send(&mut conv, prompt, skill.clone(), &interrupt, !ctx.json()).await;

    let view = ChatReplyView {
        project_id: conv.project_id().to_string(),
        prompt: prompt.to_string(),
        skill,
        reply: conv.state().last_reply().unwrap_or_default().to_string(),
        tool_calls: conv.steps().tool_call_groups[tools_before..]
            .iter()
            .flat_map(|g| g.tool_calls.clone())
            .collect(),
        query_results: conv.steps().query_groups[queries_before..]
            .iter()
            .flat_map(|g| g.results.clone())
            .collect(),
        stopped: matches!(&outcome, Ok(Some(o)) if o.stopped),
    };
    conv.close().await;

    match outcome? {
        Some(_) if ctx.json() => render(ctx.format, CommandResult::new(view)),
        Some(_) => Ok(()),
        None => Err(anyhow!("nothing to send: the prompt is empty")),
    }
}

enum Flow {
    Continue,
    Quit,
}

struct ChatSession<'a> {
    ctx: &'a ExecutionContext,
    conv: Conversation,
    store: Arc<dyn ProjectStore>,
    owner: String,
    project_name: String,
    skills_enabled: bool,
    interrupt: Interrupt,
    refresh: Arc<AtomicBool>,
}

impl ChatSession<'_> {
    fn watch_completion(&mut self) {
        let refresh = self.refresh.clone();
        self.conv.on_turn_complete(move |state| {
            tracing::debug!(messages = state.messages.len(), "turn complete");
            refresh.store(true, Ordering::SeqCst);
        });
    }

    async fn send(&mut self, prompt: &str, skill: Option<String>) {
        match send(&mut self.conv, prompt, skill, &self.interrupt, true).await {
            Ok(Some(_)) => {}
            Ok(None) => eprintln!("(a reply is still streaming)"),
            Err(e) => eprintln!("Error: {}", e),
        }
        if self.refresh.swap(false, Ordering::SeqCst) {
            self.refresh_project().await;
        }
    }

    /// Re-read the project's summary after a finished turn; best effort
    async fn refresh_project(&mut self) {
        match self.store.list(&self.owner).await {
            Ok(summaries) => {
                if let Some(summary) = summaries.iter().find(|s| &s.id == self.conv.project_id()) {
                    self.project_name = summary.name.clone();
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to refresh project list"),
        }
    }

    async fn switch_to(&mut self, project: Project) {
        self.conv.switch_project(&project).await;
        self.project_name = project.name;
        println!("Switched to {} ({})", self.project_name, project.id);
        if self.conv.messages().is_empty() {
            print_examples();
        }
    }

    async fn command(&mut self, input: &str) -> Result<Flow> {
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        match name {
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => print_help(),
            "reset" => {
                self.conv.reset();
                println!("Chat cleared.");
            }
            "activity" => {
                let report = ActivityReport {
                    project_id: self.conv.project_id().to_string(),
                    project_name: self.project_name.clone(),
                    activity: ActivityView::from_steps(self.conv.steps()),
                };
                print!("{}", report);
            }
            "examples" => print_examples(),
            "example" => {
                let question = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(example_question)
                    .ok_or_else(|| anyhow!("usage: /example <1-{}>", EXAMPLE_QUESTIONS.len()))?;
                println!("› {}", question);
                self.send(question, None).await;
            }
            "skills" => {
                match rest {
                    "on" => self.skills_enabled = true,
                    "off" => self.skills_enabled = false,
                    "" => {}
                    _ => return Err(anyhow!("usage: /skills [on|off]")),
                }
                println!("Skills {}", if self.skills_enabled { "on" } else { "off" });
            }
            "workflow" => {
                let (kind, entity) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: /workflow <target|hit|adme|safety> <entity>"))?;
                let workflow: Workflow = kind.parse()?;
                let composed = WorkflowSelection::new(workflow, entity)
                    .with_skills(self.skills_enabled)
                    .with_properties(vec![PropertySet::All])
                    .compose()?;
                println!("› {}", workflow.user_query(entity.trim()));
                self.send(&composed.prompt, composed.skill).await;
            }
            "projects" => {
                let summaries = self.store.list(&self.owner).await?;
                print!(
                    "{}",
                    ProjectListView::new(&self.owner, self.store.backend(), &summaries)
                );
            }
            "open" => {
                if rest.is_empty() {
                    return Err(anyhow!("usage: /open <project id>"));
                }
                let id = resolve_id(self.store.as_ref(), &self.owner, rest).await?;
                let project = self.store.load(&id).await?;
                self.switch_to(project).await;
            }
            "new" => {
                let name = if rest.is_empty() { DEFAULT_PROJECT_NAME } else { rest };
                let project = self.store.create(name, &self.owner).await?;
                self.switch_to(project).await;
            }
            "rename" => {
                if rest.is_empty() {
                    return Err(anyhow!("usage: /rename <name>"));
                }
                let project = self
                    .store
                    .save(self.conv.project_id(), ProjectUpdate::rename(rest))
                    .await?;
                self.project_name = project.name;
                println!("Renamed to {}", self.project_name);
            }
            other => return Err(anyhow!("unknown command '/{}', try /help", other)),
        }
        Ok(Flow::Continue)
    }
}

fn print_examples() {
    let view = ExampleListView {
        examples: EXAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    };
    print!("{}", view);
    println!("  (send one with /example <n>)");
}

fn print_help() {
    println!("Commands:");
    println!("  /example <n>                   send an example question");
    println!("  /examples                      list example questions");
    println!("  /workflow <kind> <entity>      run a guided workflow (target, hit, adme, safety)");
    println!("  /skills [on|off]               attach workflow skills");
    println!("  /activity                      show tool calls and SQL queries");
    println!("  /reset                         clear this chat");
    println!("  /projects                      list projects");
    println!("  /open <id>                     switch project");
    println!("  /new [name]                    start a new project");
    println!("  /rename <name>                 rename this project");
    println!("  /quit                          leave (Ctrl-D)");
    println!("Ctrl-C stops a streaming reply.");
}

/// Read-eval loop over stdin
pub async fn interactive(ctx: &ExecutionContext, project: Option<&str>) -> Result<()> {
    let project = ctx.resolve_project(project).await?;
    let config = ctx.config()?;
    let conv = open_conversation(ctx, &project)?;

    let mut session = ChatSession {
        ctx,
        store: ctx.store()?,
        owner: ctx.owner()?,
        project_name: project.name.clone(),
        skills_enabled: config.conversation.skills_enabled,
        interrupt: Interrupt::install()?,
        refresh: Arc::new(AtomicBool::new(false)),
        conv,
    };
    session.watch_completion();

    println!(
        "AiChemy · {} ({}) · agent: {}",
        session.project_name,
        project.id,
        session.conv.transport_name()
    );
    println!("Type /help for commands, Ctrl-D to quit.");
    if session.conv.messages().is_empty() {
        print_examples();
    }

    let quit = session.interrupt.quit.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} › ", session.project_name);
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = quit.notified() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match session.command(command).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("{}", e),
            }
            continue;
        }
        session.send(line, None).await;
    }

    tracing::debug!(data_dir = %session.ctx.data_dir().display(), "closing chat");
    session.conv.close().await;
    Ok(())
}
