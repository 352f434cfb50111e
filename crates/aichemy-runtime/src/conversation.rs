//! Per-project conversation state machine.
//!
//! A `Conversation` owns the transcript and activity log of one project.
//! At most one turn is in flight: `submit` moves Idle -> Sending and hands
//! back a [`Turn`] whose events are fed to [`Conversation::apply`] on the
//! same task, and `done`, stream end or [`Conversation::stop`] return to
//! Idle. Every mutation schedules a debounced save of the full snapshot.

use aichemy_types::{
    AgentRequest, AgentSteps, Message, Project, ProjectId, ProjectUpdate, QueryResult,
    QueryResultGroup, Role, StreamEvent, ToolCall, ToolCallGroup,
};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::debounce::Debouncer;
use crate::store::ProjectStore;
use crate::transport::{AgentTransport, EventStream};
use crate::Result;

pub type TurnId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

/// Observable state of a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub steps: AgentSteps,
    pub phase: Phase,
    /// Transient progress line, cleared by the first text delta
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// What a single event did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Nothing changed
    Ignored,
    /// Only transient fields changed; nothing to persist
    Transient,
    /// Messages or activity groups changed
    Mutated,
    /// The turn is over
    Finished,
}

/// Per-turn bookkeeping used by the reducer
#[derive(Debug, Clone, Default)]
pub struct TurnProgress {
    prompt: String,
    tool_group: Option<usize>,
    query_group: Option<usize>,
}

impl TurnProgress {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tool_group: None,
            query_group: None,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Format used when an error replaces the assistant placeholder
pub fn error_notice(message: &str) -> String {
    format!("Error: {}", message)
}

impl ConversationState {
    pub fn from_project(project: &Project) -> Self {
        Self {
            messages: project.messages.clone(),
            steps: project.agent_steps.clone(),
            phase: Phase::Idle,
            status: None,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.phase == Phase::Sending
    }

    /// Full snapshot for persistence
    pub fn snapshot(&self) -> ProjectUpdate {
        ProjectUpdate::snapshot(self.messages.clone(), self.steps.clone())
    }

    /// Content of the trailing assistant message, if the transcript ends in one
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    fn placeholder_mut(&mut self) -> Option<&mut Message> {
        self.messages.last_mut().filter(|m| m.role == Role::Assistant)
    }

    /// Apply one event of the live turn described by `progress`.
    ///
    /// Tool-call and query-result batches of the same turn land in a single
    /// group tagged with the turn's prompt; groups of earlier turns are
    /// never touched.
    pub fn reduce(&mut self, progress: &mut TurnProgress, event: StreamEvent) -> Applied {
        match event {
            StreamEvent::TextDelta { content } => {
                self.status = None;
                if content.is_empty() {
                    return Applied::Transient;
                }
                match self.placeholder_mut() {
                    Some(reply) => {
                        reply.content.push_str(&content);
                        Applied::Mutated
                    }
                    None => Applied::Transient,
                }
            }
            StreamEvent::Status { message } => {
                self.status = Some(message);
                Applied::Transient
            }
            StreamEvent::ToolCalls { calls } => self.append_tool_calls(progress, calls),
            StreamEvent::QueryResults { results } => self.append_query_results(progress, results),
            StreamEvent::Error { message } => {
                self.status = None;
                match self.placeholder_mut() {
                    Some(reply) => {
                        reply.content = error_notice(&message);
                        Applied::Mutated
                    }
                    None => Applied::Ignored,
                }
            }
            StreamEvent::Done => Applied::Finished,
        }
    }

    fn append_tool_calls(&mut self, progress: &mut TurnProgress, calls: Vec<ToolCall>) -> Applied {
        if calls.is_empty() {
            return Applied::Ignored;
        }
        match progress.tool_group {
            Some(index) => {
                tracing::debug!(count = calls.len(), "extending tool-call group of current turn");
                self.steps.tool_call_groups[index].tool_calls.extend(calls);
            }
            None => {
                self.steps.tool_call_groups.push(ToolCallGroup {
                    prompt: progress.prompt.clone(),
                    tool_calls: calls,
                });
                progress.tool_group = Some(self.steps.tool_call_groups.len() - 1);
            }
        }
        Applied::Mutated
    }

    fn append_query_results(
        &mut self,
        progress: &mut TurnProgress,
        results: Vec<QueryResult>,
    ) -> Applied {
        if results.is_empty() {
            return Applied::Ignored;
        }
        match progress.query_group {
            Some(index) => {
                self.steps.query_groups[index].results.extend(results);
            }
            None => {
                self.steps.query_groups.push(QueryResultGroup {
                    prompt: progress.prompt.clone(),
                    results,
                });
                progress.query_group = Some(self.steps.query_groups.len() - 1);
            }
        }
        Applied::Mutated
    }
}

/// A snapshot queued for the store
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub project_id: ProjectId,
    pub update: ProjectUpdate,
}

/// Debounced writer of conversation snapshots
pub type Autosave = Debouncer<PendingSave>;

/// Spawn an autosave task writing into `store`; failures are logged only
pub fn spawn_autosave(store: Arc<dyn ProjectStore>, delay: Duration) -> Autosave {
    Debouncer::spawn(delay, move |pending: PendingSave| {
        let store = store.clone();
        async move {
            match store.save(&pending.project_id, pending.update).await {
                Ok(_) => tracing::debug!(project = %pending.project_id, "autosaved project"),
                Err(e) => tracing::warn!(
                    project = %pending.project_id,
                    error = %e,
                    "failed to save project"
                ),
            }
        }
    })
}

/// An in-flight request returned by [`Conversation::submit`]
pub struct Turn {
    pub id: TurnId,
    pub events: EventStream,
    /// Cancels the network read; share it with signal handlers
    pub cancel: CancellationToken,
}

struct ActiveTurn {
    id: TurnId,
    cancel: CancellationToken,
    progress: TurnProgress,
}

type CompletionHook = Box<dyn FnMut(&ConversationState) + Send>;

pub struct Conversation {
    project_id: ProjectId,
    state: ConversationState,
    transport: Arc<dyn AgentTransport>,
    autosave: Autosave,
    active: Option<ActiveTurn>,
    last_turn: TurnId,
    on_complete: Option<CompletionHook>,
}

impl Conversation {
    /// Conversation over an existing project. Must be called inside a tokio
    /// runtime; the autosave timer is spawned here.
    pub fn new(
        project: &Project,
        transport: Arc<dyn AgentTransport>,
        store: Arc<dyn ProjectStore>,
        autosave_delay: Duration,
    ) -> Self {
        Self::with_autosave(project, transport, spawn_autosave(store, autosave_delay))
    }

    pub fn with_autosave(
        project: &Project,
        transport: Arc<dyn AgentTransport>,
        autosave: Autosave,
    ) -> Self {
        Self {
            project_id: project.id.clone(),
            state: ConversationState::from_project(project),
            transport,
            autosave,
            active: None,
            last_turn: 0,
            on_complete: None,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn steps(&self) -> &AgentSteps {
        &self.state.steps
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_sending(&self) -> bool {
        self.state.is_sending()
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Called once per turn that ends with `done` or a normal stream end
    pub fn on_turn_complete<F>(&mut self, hook: F)
    where
        F: FnMut(&ConversationState) + Send + 'static,
    {
        self.on_complete = Some(Box::new(hook));
    }

    fn schedule_save(&self) {
        self.autosave.schedule(PendingSave {
            project_id: self.project_id.clone(),
            update: self.state.snapshot(),
        });
    }

    /// Extend the queued snapshot's reply by `delta` instead of copying the
    /// whole transcript again. Falls back to a full snapshot when nothing of
    /// this project is queued.
    fn schedule_reply_delta(&self, delta: &str) {
        self.autosave.schedule_with(|pending| {
            let reply = pending
                .as_mut()
                .filter(|p| p.project_id == self.project_id)
                .and_then(|p| p.update.messages.as_mut())
                .and_then(|messages| messages.last_mut())
                .filter(|m| m.role == Role::Assistant);
            match reply {
                Some(reply) => reply.content.push_str(delta),
                None => {
                    *pending = Some(PendingSave {
                        project_id: self.project_id.clone(),
                        update: self.state.snapshot(),
                    })
                }
            }
        });
    }

    /// Start a turn.
    ///
    /// Returns `Ok(None)` for a blank prompt or while another turn is in
    /// flight. A transport failure is written into the assistant
    /// placeholder, the conversation returns to Idle, and the error is
    /// returned.
    pub async fn submit(&mut self, prompt: &str, skill: Option<String>) -> Result<Option<Turn>> {
        self.submit_with_cancel(prompt, skill, CancellationToken::new())
            .await
    }

    /// Like [`Conversation::submit`], but the turn is bound to `cancel`.
    /// The caller can hand the token to a signal handler before the request
    /// goes out; cancelling it while the transport is still connecting
    /// yields a turn that ends as a stop.
    pub async fn submit_with_cancel(
        &mut self,
        prompt: &str,
        skill: Option<String>,
        cancel: CancellationToken,
    ) -> Result<Option<Turn>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }
        if self.is_sending() {
            tracing::debug!("turn already in flight, ignoring submit");
            return Ok(None);
        }

        let history = {
            let mut history = self.state.messages.clone();
            history.push(Message::user(prompt));
            history
        };
        let request = AgentRequest::new(history, &self.project_id).with_skill(skill);

        self.state.messages.push(Message::user(prompt));
        self.state.messages.push(Message::assistant(""));
        self.state.phase = Phase::Sending;
        self.state.status = None;
        self.schedule_save();

        self.last_turn += 1;
        let id = self.last_turn;
        self.active = Some(ActiveTurn {
            id,
            cancel: cancel.clone(),
            progress: TurnProgress::new(prompt),
        });
        tracing::info!(
            turn = id,
            project = %self.project_id,
            transport = self.transport.name(),
            skill = request.skill_name.as_deref().unwrap_or("-"),
            "turn started"
        );

        match self.transport.open(&request, cancel.clone()).await {
            Ok(events) => Ok(Some(Turn { id, events, cancel })),
            Err(e) => {
                tracing::warn!(turn = id, error = %e, "agent request failed");
                if let Some(reply) = self.state.placeholder_mut() {
                    reply.content = error_notice(&e.to_string());
                }
                self.active = None;
                self.state.phase = Phase::Idle;
                self.state.status = None;
                self.schedule_save();
                Err(e)
            }
        }
    }

    /// Apply an event of turn `turn`. Events of any other turn, including
    /// one that was stopped, are dropped and `false` is returned.
    pub fn apply(&mut self, turn: TurnId, event: StreamEvent) -> bool {
        let Some(active) = self.active.as_mut().filter(|a| a.id == turn) else {
            tracing::debug!(turn, kind = event.kind(), "dropping event of inactive turn");
            return false;
        };

        let delta = match &event {
            StreamEvent::TextDelta { content } => Some(content.clone()),
            _ => None,
        };
        match self.state.reduce(&mut active.progress, event) {
            Applied::Mutated => match delta {
                Some(delta) => self.schedule_reply_delta(&delta),
                None => self.schedule_save(),
            },
            Applied::Finished => {
                self.complete(turn);
            }
            Applied::Ignored | Applied::Transient => {}
        }
        true
    }

    /// Finish turn `turn` normally. Idempotent; the completion hook fires
    /// only on the first call.
    pub fn complete(&mut self, turn: TurnId) -> bool {
        if !self.active.as_ref().is_some_and(|a| a.id == turn) {
            return false;
        }
        self.active = None;
        self.state.phase = Phase::Idle;
        self.state.status = None;
        tracing::info!(turn, project = %self.project_id, "turn finished");

        if let Some(hook) = self.on_complete.as_mut() {
            hook(&self.state);
        }
        true
    }

    /// Abort the in-flight turn. Partial output is kept; the completion
    /// hook does not fire.
    pub fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        self.state.phase = Phase::Idle;
        self.state.status = None;
        tracing::info!(turn = active.id, "turn stopped");
        true
    }

    /// Clear messages and activity, force Idle and persist the empty state
    pub fn reset(&mut self) {
        self.stop();
        self.state.messages.clear();
        self.state.steps.clear();
        self.state.status = None;
        self.schedule_save();
    }

    /// Consume a turn's events until it ends, reporting each applied event
    /// to `observer`.
    ///
    /// A turn whose token was cancelled from outside ends as a stop.
    pub async fn drive_with<F>(&mut self, turn: Turn, mut observer: F) -> Phase
    where
        F: FnMut(&StreamEvent),
    {
        let Turn {
            id,
            mut events,
            cancel,
        } = turn;

        while let Some(event) = events.next().await {
            observer(&event);
            if !self.apply(id, event) {
                break;
            }
            if !self.active.as_ref().is_some_and(|a| a.id == id) {
                break;
            }
        }

        if cancel.is_cancelled() {
            if self.active.as_ref().is_some_and(|a| a.id == id) {
                self.stop();
            }
        } else {
            self.complete(id);
        }
        self.phase()
    }

    pub async fn drive(&mut self, turn: Turn) -> Phase {
        self.drive_with(turn, |_| {}).await
    }

    /// Write any pending snapshot now
    pub async fn flush(&self) {
        self.autosave.flush().await;
    }

    /// Replace the owned state with another project's.
    ///
    /// The in-flight turn is stopped and the previous project's pending
    /// snapshot is written before the swap.
    pub async fn switch_project(&mut self, project: &Project) {
        self.stop();
        self.autosave.flush().await;
        self.project_id = project.id.clone();
        self.state = ConversationState::from_project(project);
        tracing::debug!(project = %self.project_id, "switched project");
    }

    /// Flush pending saves and stop the autosave task
    pub async fn close(mut self) {
        self.stop();
        self.autosave.shutdown().await;
    }
}
