//! Project persistence behind one async interface.

mod backend;
mod sqlite;

pub use backend::BackendClient;
pub use sqlite::SqliteStore;

use aichemy_types::{Project, ProjectId, ProjectSummary, ProjectUpdate};
use async_trait::async_trait;

use crate::Result;

/// Keyed project storage.
///
/// Each call is an atomic read or replace of a single record.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Summaries owned by `owner`, most recently updated first
    async fn list(&self, owner: &str) -> Result<Vec<ProjectSummary>>;

    async fn create(&self, name: &str, owner: &str) -> Result<Project>;

    /// Fails with `Error::NotFound` when the id is unknown
    async fn load(&self, id: &ProjectId) -> Result<Project>;

    /// Set any subset of {name, messages, agent_steps}; `Error::NotFound`
    /// when the id is unknown
    async fn save(&self, id: &ProjectId, update: ProjectUpdate) -> Result<Project>;

    /// True when a record was removed
    async fn delete(&self, id: &ProjectId) -> Result<bool>;

    /// Storage kind for diagnostics ("sqlite", "http")
    fn backend(&self) -> &'static str;
}

/// Load the most recent project of `owner`, creating one when there is none
pub async fn open_latest(store: &dyn ProjectStore, owner: &str, default_name: &str) -> Result<Project> {
    match store.list(owner).await?.first() {
        Some(summary) => store.load(&summary.id).await,
        None => store.create(default_name, owner).await,
    }
}

/// Resolve a full id or a unique prefix of one
pub async fn resolve_id(store: &dyn ProjectStore, owner: &str, needle: &str) -> Result<ProjectId> {
    let summaries = store.list(owner).await?;
    if let Some(exact) = summaries.iter().find(|s| s.id.as_str() == needle) {
        return Ok(exact.id.clone());
    }

    let mut matches = summaries.iter().filter(|s| s.id.as_str().starts_with(needle));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(only.id.clone()),
        (None, _) => Err(crate::Error::NotFound(format!("project {}", needle))),
        (Some(_), Some(_)) => Err(crate::Error::InvalidInput(format!(
            "ambiguous project id prefix '{}': multiple projects match",
            needle
        ))),
    }
}
