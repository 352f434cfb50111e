use aichemy_runtime::skills::extract_user_request;
use aichemy_types::{Message, Project, ProjectSummary, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

fn short_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[derive(Debug, Serialize)]
pub struct ProjectListView {
    pub owner: String,
    pub backend: String,
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProjectEntry {
    pub id: String,
    pub id_short: String,
    pub name: String,
    pub updated_at: String,
}

impl ProjectListView {
    pub fn new(owner: &str, backend: &str, summaries: &[ProjectSummary]) -> Self {
        Self {
            owner: owner.to_string(),
            backend: backend.to_string(),
            projects: summaries
                .iter()
                .map(|s| ProjectEntry {
                    id: s.id.to_string(),
                    id_short: short_id(s.id.as_str()),
                    name: s.name.clone(),
                    updated_at: short_time(&s.updated_at),
                })
                .collect(),
        }
    }
}

impl fmt::Display for ProjectListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.projects.is_empty() {
            writeln!(f, "No projects yet.")?;
            return Ok(());
        }

        writeln!(f, "Projects of {} ({}):", self.owner, self.backend)?;
        writeln!(f, "{:<10} {:<32} UPDATED", "ID", "NAME")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for project in &self.projects {
            writeln!(
                f,
                "{:<10} {:<32} {}",
                project.id_short, project.name, project.updated_at
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub tool_call_groups: usize,
    pub query_groups: usize,
}

impl From<Project> for ProjectDetailView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
            created_at: project.created_at,
            updated_at: project.updated_at,
            tool_call_groups: project.agent_steps.tool_call_groups.len(),
            query_groups: project.agent_steps.query_groups.len(),
            messages: project.messages,
        }
    }
}

impl fmt::Display for ProjectDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project: {} ({})", self.name, self.id)?;
        writeln!(f, "Updated: {} UTC", short_time(&self.updated_at))?;
        writeln!(
            f,
            "Activity: {} tool-call group(s), {} query group(s)",
            self.tool_call_groups, self.query_groups
        )?;
        writeln!(f)?;

        if self.messages.is_empty() {
            writeln!(f, "(no messages)")?;
            return Ok(());
        }
        for message in &self.messages {
            match message.role {
                Role::User => writeln!(f, "You: {}", extract_user_request(&message.content))?,
                Role::Assistant => writeln!(f, "AiChemy: {}", message.content)?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectActionView {
    pub action: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for ProjectActionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => writeln!(f, "{} project {} ({})", self.action, name, self.id),
            None => writeln!(f, "{} project {}", self.action, self.id),
        }
    }
}
