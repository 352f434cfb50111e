use aichemy_runtime::Config;
use aichemy_types::{HealthStatus, UserIdentity};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub endpoint: String,
    #[serde(flatten)]
    pub user: UserIdentity,
}

impl fmt::Display for UserView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoint: {}", self.endpoint)?;
        writeln!(f, "User:     {}", self.user.user_name.as_deref().unwrap_or("(unknown)"))?;
        writeln!(f, "Email:    {}", self.user.user_email.as_deref().unwrap_or("-"))?;
        writeln!(f, "User id:  {}", self.user.user_id.as_deref().unwrap_or("-"))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub endpoint: String,
    #[serde(flatten)]
    pub health: HealthStatus,
}

impl fmt::Display for HealthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoint: {}", self.endpoint)?;
        writeln!(f, "Status:   {}", self.health.status)?;
        if let Some(host) = &self.health.host {
            writeln!(f, "Host:     {}", host)?;
        }
        match &self.health.db_detail {
            Some(detail) => writeln!(f, "Storage:  {} ({})", self.health.db_backend, detail),
            None => writeln!(f, "Storage:  {}", self.health.db_backend),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub path: String,
    pub exists: bool,
    pub config: Config,
}

impl fmt::Display for ConfigView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.exists { "" } else { " (not created, showing defaults)" };
        writeln!(f, "# {}{}", self.path, state)?;
        match toml::to_string_pretty(&self.config) {
            Ok(text) => write!(f, "{}", text),
            Err(_) => Err(fmt::Error),
        }
    }
}
