use aichemy_index::Database;
use aichemy_types::{Project, ProjectId, ProjectSummary, ProjectUpdate};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::ProjectStore;
use crate::{Error, Result};

/// Project store backed by the local SQLite index
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run a database call on the blocking pool
    async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|_| Error::InvalidOperation("project database lock poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn list(&self, owner: &str) -> Result<Vec<ProjectSummary>> {
        let owner = owner.to_string();
        self.with_db(move |db| Ok(db.list_projects(&owner)?)).await
    }

    async fn create(&self, name: &str, owner: &str) -> Result<Project> {
        let name = name.to_string();
        let owner = owner.to_string();
        self.with_db(move |db| Ok(db.create_project(&owner, &name)?))
            .await
    }

    async fn load(&self, id: &ProjectId) -> Result<Project> {
        let id = id.clone();
        self.with_db(move |db| {
            db.get_project(&id)?
                .ok_or_else(|| Error::NotFound(format!("project {}", id)))
        })
        .await
    }

    async fn save(&self, id: &ProjectId, update: ProjectUpdate) -> Result<Project> {
        let id = id.clone();
        self.with_db(move |db| {
            db.update_project(&id, &update)?
                .ok_or_else(|| Error::NotFound(format!("project {}", id)))
        })
        .await
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool> {
        let id = id.clone();
        self.with_db(move |db| Ok(db.delete_project(&id)?)).await
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{open_latest, resolve_id};
    use aichemy_types::Message;

    #[tokio::test]
    async fn test_crud_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let project = store.create("EGFR", "alice").await.unwrap();
        let saved = store
            .save(
                &project.id,
                ProjectUpdate {
                    messages: Some(vec![Message::user("hi")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.messages.len(), 1);

        let loaded = store.load(&project.id).await.unwrap();
        assert_eq!(loaded.messages, saved.messages);

        assert!(store.delete(&project.id).await.unwrap());
        let err = store.load(&project.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_unknown_project_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .save(&ProjectId::new("ghost"), ProjectUpdate::rename("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_latest_creates_when_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = open_latest(&store, "alice", "Untitled").await.unwrap();
        assert_eq!(first.name, "Untitled");

        let again = open_latest(&store, "alice", "Untitled").await.unwrap();
        assert_eq!(again.id, first.id);
    }

    #[tokio::test]
    async fn test_resolve_id_by_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = store.create("p", "alice").await.unwrap();

        let prefix = &project.id.as_str()[..8];
        let resolved = resolve_id(&store, "alice", prefix).await.unwrap();
        assert_eq!(resolved, project.id);

        assert!(resolve_id(&store, "alice", "zzzz").await.unwrap_err().is_not_found());
    }
}
