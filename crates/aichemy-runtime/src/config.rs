use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_OWNER: &str = "local";

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. AICHEMY_PATH environment variable (with tilde expansion)
/// 3. ~/.aichemy
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("AICHEMY_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".aichemy"));
    }

    Err(Error::Config(
        "Could not determine data directory: no HOME directory found".to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub stream_path: String,
    pub invoke_path: String,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Use the SSE endpoint; when false the blocking endpoint is called
    pub streaming: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/api/agent/stream".to_string(),
            invoke_path: "/api/agent".to_string(),
            token: None,
            streaming: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local SQLite file
    #[default]
    Sqlite,
    /// Backend REST API at `endpoint.base_url`
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Defaults to `<data_dir>/projects.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub autosave_debounce_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Attach skill identifiers to workflow prompts
    pub skills_enabled: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 500,
            owner_id: None,
            skills_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Defaults to `<data_dir>/skills`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<PathBuf>,
    /// Defaults to `<data_dir>/tools.txt`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load `config.toml` from the data directory and apply environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_from(&data_dir.join("config.toml"))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply AICHEMY_ENDPOINT, AICHEMY_TOKEN and AICHEMY_USER_ID
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AICHEMY_ENDPOINT").filter(|v| !v.is_empty()) {
            self.endpoint.base_url = url;
        }
        if let Some(token) = lookup("AICHEMY_TOKEN").filter(|v| !v.is_empty()) {
            self.endpoint.token = Some(token);
        }
        if let Some(user) = lookup("AICHEMY_USER_ID").filter(|v| !v.is_empty()) {
            self.conversation.owner_id = Some(user);
        }
    }

    pub fn owner_id(&self) -> &str {
        self.conversation
            .owner_id
            .as_deref()
            .unwrap_or(DEFAULT_OWNER)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.conversation.autosave_debounce_ms)
    }

    pub fn sqlite_path(&self, data_dir: &Path) -> PathBuf {
        self.storage
            .sqlite_path
            .clone()
            .unwrap_or_else(|| data_dir.join("projects.db"))
    }

    pub fn skills_dir(&self, data_dir: &Path) -> PathBuf {
        self.catalog
            .skills_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("skills"))
    }

    pub fn tools_path(&self, data_dir: &Path) -> PathBuf {
        self.catalog
            .tools_path
            .clone()
            .unwrap_or_else(|| data_dir.join("tools.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.endpoint.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.autosave_delay(), Duration::from_millis(500));
        assert_eq!(config.owner_id(), DEFAULT_OWNER);
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.storage.backend = StorageBackend::Http;
        config.conversation.autosave_debounce_ms = 250;
        config.endpoint.token = Some("secret".to_string());

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[endpoint]\nbase_url = \"https://agent.example\"\n\n[conversation]\nskills_enabled = true\n",
        )?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.endpoint.base_url, "https://agent.example");
        assert_eq!(loaded.endpoint.stream_path, "/api/agent/stream");
        assert!(loaded.conversation.skills_enabled);
        assert_eq!(loaded.conversation.autosave_debounce_ms, 500);

        Ok(())
    }

    #[test]
    fn test_invalid_backend_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[storage]\nbackend = \"postgres\"\n")?;

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_from(&temp_dir.path().join("nonexistent.toml"))?;
        assert_eq!(config, Config::default());

        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AICHEMY_ENDPOINT", "http://10.0.0.2:9000"),
            ("AICHEMY_USER_ID", "alice@example.com"),
            ("AICHEMY_TOKEN", ""),
        ]);

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.endpoint.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.owner_id(), "alice@example.com");
        assert_eq!(config.endpoint.token, None);
    }

    #[test]
    fn test_default_paths_live_under_data_dir() {
        let config = Config::default();
        let data_dir = Path::new("/data");
        assert_eq!(config.sqlite_path(data_dir), PathBuf::from("/data/projects.db"));
        assert_eq!(config.skills_dir(data_dir), PathBuf::from("/data/skills"));
        assert_eq!(config.tools_path(data_dir), PathBuf::from("/data/tools.txt"));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some("/tmp/aichemy-test")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/aichemy-test"));
    }
}
