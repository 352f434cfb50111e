use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::message::Message;
use super::steps::AgentSteps;

/// Opaque identifier of a saved project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Listing row: everything except the conversation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved conversation with its tool activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub agent_steps: AgentSteps,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_steps: Option<AgentSteps>,
}

impl ProjectUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Full conversation snapshot, as written by autosave
    pub fn snapshot(messages: Vec<Message>, agent_steps: AgentSteps) -> Self {
        Self {
            name: None,
            messages: Some(messages),
            agent_steps: Some(agent_steps),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.messages.is_none() && self.agent_steps.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_skips_absent_fields() {
        let update = ProjectUpdate::rename("EGFR study");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"name": "EGFR study"}));
        assert!(!update.is_empty());
        assert!(ProjectUpdate::default().is_empty());
    }

    #[test]
    fn test_project_parses_backend_timestamps() {
        let json = r#"{
            "id": "p1",
            "name": "Untitled",
            "messages": [],
            "agent_steps": [],
            "created_at": "2025-03-01T10:00:00.123456+00:00",
            "updated_at": "2025-03-01T10:05:00+00:00"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id.as_str(), "p1");
        assert!(project.agent_steps.is_empty());
        assert!(project.updated_at > project.created_at);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ProjectId::generate(), ProjectId::generate());
    }
}
