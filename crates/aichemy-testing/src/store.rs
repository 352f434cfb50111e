use aichemy_runtime::store::ProjectStore;
use aichemy_runtime::{Error, Result};
use aichemy_types::{AgentSteps, Project, ProjectId, ProjectSummary, ProjectUpdate};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Instant;

/// One call to `save`
#[derive(Debug, Clone)]
pub struct SaveRecord {
    pub id: ProjectId,
    pub update: ProjectUpdate,
    pub at: Instant,
}

#[derive(Default)]
struct Inner {
    projects: Vec<(String, Project)>,
    saves: Vec<SaveRecord>,
}

/// In-memory project store that records every save
#[derive(Default)]
pub struct RecordingStore {
    inner: Mutex<Inner>,
    fail_saves: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail after being recorded
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<SaveRecord> {
        self.inner
            .lock()
            .map(|inner| inner.saves.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves.len()).unwrap_or_default()
    }

    pub fn last_save(&self) -> Option<SaveRecord> {
        self.saves().pop()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::InvalidOperation("recording store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProjectStore for RecordingStore {
    async fn list(&self, owner: &str) -> Result<Vec<ProjectSummary>> {
        let inner = self.lock()?;
        let mut summaries: Vec<ProjectSummary> = inner
            .projects
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, p)| p.summary())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn create(&self, name: &str, owner: &str) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: ProjectId::generate(),
            name: name.to_string(),
            messages: Vec::new(),
            agent_steps: AgentSteps::default(),
            created_at: now,
            updated_at: now,
        };
        self.lock()?.projects.push((owner.to_string(), project.clone()));
        Ok(project)
    }

    async fn load(&self, id: &ProjectId) -> Result<Project> {
        self.lock()?
            .projects
            .iter()
            .find(|(_, p)| &p.id == id)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }

    async fn save(&self, id: &ProjectId, update: ProjectUpdate) -> Result<Project> {
        let mut inner = self.lock()?;
        inner.saves.push(SaveRecord {
            id: id.clone(),
            update: update.clone(),
            at: Instant::now(),
        });
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Status {
                status: 503,
                body: "store unavailable".to_string(),
            });
        }

        let (_, project) = inner
            .projects
            .iter_mut()
            .find(|(_, p)| &p.id == id)
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(messages) = update.messages {
            project.messages = messages;
        }
        if let Some(steps) = update.agent_steps {
            project.agent_steps = steps;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.projects.len();
        inner.projects.retain(|(_, p)| &p.id != id);
        Ok(inner.projects.len() != before)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
