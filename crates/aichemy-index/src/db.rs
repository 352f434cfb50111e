use aichemy_types::{AgentSteps, Project, ProjectId, ProjectSummary, ProjectUpdate};
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

use crate::records::{ProjectRecord, format_timestamp};
use crate::{Result, queries, schema};

/// Handle to the project database.
///
/// Every public method is a single-record read or replace; updates run in
/// a transaction so a concurrent reader never sees half a snapshot.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        schema::init_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "opened project database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Projects owned by `user_id`, most recently updated first
    pub fn list_projects(&self, user_id: &str) -> Result<Vec<ProjectSummary>> {
        queries::project::list_for_owner(&self.conn, user_id)?
            .into_iter()
            .map(|record| record.into_summary())
            .collect()
    }

    /// Create an empty project and return it
    pub fn create_project(&self, user_id: &str, name: &str) -> Result<Project> {
        let now = Utc::now();
        let stamp = format_timestamp(now);
        let record = ProjectRecord {
            id: ProjectId::generate(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            messages: "[]".to_string(),
            agent_steps: serde_json::to_string(&AgentSteps::default())?,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        queries::project::insert(&self.conn, &record)?;
        tracing::debug!(id = %record.id, name, "created project");
        record.into_project()
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        queries::project::get(&self.conn, id.as_str())?
            .map(ProjectRecord::into_project)
            .transpose()
    }

    /// Apply a partial update; `None` when the project does not exist
    pub fn update_project(&self, id: &ProjectId, update: &ProjectUpdate) -> Result<Option<Project>> {
        let tx = self.conn.unchecked_transaction()?;
        let stamp = format_timestamp(Utc::now());
        if !queries::project::update(&tx, id.as_str(), update, &stamp)? {
            return Ok(None);
        }
        let record = queries::project::get(&tx, id.as_str())?;
        tx.commit()?;
        record.map(ProjectRecord::into_project).transpose()
    }

    /// Returns true when a row was removed
    pub fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        let deleted = queries::project::delete(&self.conn, id.as_str())?;
        if deleted {
            tracing::debug!(id = %id, "deleted project");
        }
        Ok(deleted)
    }
}
