use aichemy_runtime::store::{open_latest, resolve_id};
use aichemy_runtime::{
    AgentTransport, BackendClient, Config, HttpTransport, MockTransport, ProjectStore,
    SqliteStore, StorageBackend,
};
use aichemy_types::Project;
use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::OutputFormat;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled";

pub struct ExecutionContext {
    data_dir: PathBuf,
    pub format: OutputFormat,
    endpoint: Option<String>,
    mock: bool,
    config: OnceCell<Config>,
    store: OnceCell<Arc<dyn ProjectStore>>,
}

impl ExecutionContext {
    pub fn new(
        data_dir: PathBuf,
        format: OutputFormat,
        endpoint: Option<String>,
        mock: bool,
    ) -> Self {
        Self {
            data_dir,
            format,
            endpoint,
            mock,
            config: OnceCell::new(),
            store: OnceCell::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn config(&self) -> Result<&Config> {
        self.config.get_or_try_init(|| {
            let mut config = Config::load(&self.data_dir)?;
            if let Some(url) = &self.endpoint {
                config.endpoint.base_url = url.clone();
            }
            Ok(config)
        })
    }

    pub fn owner(&self) -> Result<String> {
        Ok(self.config()?.owner_id().to_string())
    }

    pub fn backend(&self) -> Result<BackendClient> {
        Ok(BackendClient::new(&self.config()?.endpoint)?)
    }

    /// Project store selected by `storage.backend`
    pub fn store(&self) -> Result<Arc<dyn ProjectStore>> {
        let store = self.store.get_or_try_init(|| -> Result<Arc<dyn ProjectStore>> {
            let config = self.config()?;
            match config.storage.backend {
                StorageBackend::Sqlite => {
                    let path = config.sqlite_path(&self.data_dir);
                    tracing::debug!(path = %path.display(), "opening project database");
                    Ok(Arc::new(SqliteStore::open(&path)?))
                }
                StorageBackend::Http => Ok(Arc::new(self.backend()?)),
            }
        })?;
        Ok(store.clone())
    }

    pub fn transport(&self) -> Result<Arc<dyn AgentTransport>> {
        if self.mock {
            return Ok(Arc::new(MockTransport::new()));
        }
        Ok(Arc::new(HttpTransport::new(&self.config()?.endpoint)?))
    }

    /// Load the project named by id or unique id prefix, or the most recent
    /// one (created on first use) when no id is given
    pub async fn resolve_project(&self, needle: Option<&str>) -> Result<Project> {
        let store = self.store()?;
        let owner = self.owner()?;
        match needle {
            Some(needle) => {
                let id = resolve_id(store.as_ref(), &owner, needle).await?;
                Ok(store.load(&id).await?)
            }
            None => Ok(open_latest(store.as_ref(), &owner, DEFAULT_PROJECT_NAME).await?),
        }
    }

    pub fn skills_dir(&self) -> Result<PathBuf> {
        Ok(self.config()?.skills_dir(&self.data_dir))
    }

    pub fn tools_path(&self) -> Result<PathBuf> {
        Ok(self.config()?.tools_path(&self.data_dir))
    }
}
