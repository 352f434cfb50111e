use aichemy_types::{AgentSteps, Message, Project, ProjectId, ProjectSummary};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

/// Raw project row from the index database.
///
/// JSON columns are kept as text and decoded on demand.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    /// Project identifier (UUID v4 string).
    pub id: ProjectId,
    /// Owner of the project.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// JSON array of `{role, content}` messages.
    pub messages: String,
    /// JSON object `{toolCallGroups, genieGroups}`; legacy rows hold `[]`.
    pub agent_steps: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last modification timestamp (RFC 3339).
    pub updated_at: String,
}

impl ProjectRecord {
    /// Decode the JSON columns into a domain project
    pub fn into_project(self) -> Result<Project> {
        let messages: Vec<Message> = serde_json::from_str(&self.messages)?;
        let agent_steps: AgentSteps = serde_json::from_str(&self.agent_steps)?;
        Ok(Project {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
            messages,
            agent_steps,
        })
    }
}

/// Listing row without the JSON payload columns
#[derive(Debug, Clone)]
pub(crate) struct SummaryRecord {
    pub id: ProjectId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SummaryRecord {
    pub fn into_summary(self) -> Result<ProjectSummary> {
        Ok(ProjectSummary {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
        })
    }
}

/// Fixed-width RFC 3339 so lexical order in SQL equals time order
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Query(format!("invalid timestamp '{}': {}", raw, e)))
}
