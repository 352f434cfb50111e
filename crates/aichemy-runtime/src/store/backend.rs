use aichemy_types::{
    HealthStatus, Project, ProjectId, ProjectSummary, ProjectUpdate, SkillCatalog, ToolCatalog,
    UserIdentity,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ProjectStore;
use crate::config::EndpointConfig;
use crate::{Error, Result};

#[derive(Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    user_id: &'a str,
}

/// REST client for the agent proxy's project and catalog endpoints
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aichemy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            token: endpoint.token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn tools(&self) -> Result<ToolCatalog> {
        self.send_json(self.request(reqwest::Method::GET, "/api/tools"))
            .await
    }

    pub async fn skills(&self) -> Result<SkillCatalog> {
        self.send_json(self.request(reqwest::Method::GET, "/api/skills"))
            .await
    }

    pub async fn user(&self) -> Result<UserIdentity> {
        self.send_json(self.request(reqwest::Method::GET, "/api/user"))
            .await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.send_json(self.request(reqwest::Method::GET, "/api/health"))
            .await
    }
}

fn not_found_as(err: Error, id: &ProjectId) -> Error {
    match err {
        Error::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            Error::NotFound(format!("project {}", id))
        }
        other => other,
    }
}

#[async_trait]
impl ProjectStore for BackendClient {
    async fn list(&self, owner: &str) -> Result<Vec<ProjectSummary>> {
        let builder = self
            .request(reqwest::Method::GET, "/api/projects")
            .query(&[("user_id", owner)]);
        self.send_json(builder).await
    }

    async fn create(&self, name: &str, owner: &str) -> Result<Project> {
        let builder = self
            .request(reqwest::Method::POST, "/api/projects")
            .json(&CreateProjectBody {
                name,
                user_id: owner,
            });
        self.send_json(builder).await
    }

    async fn load(&self, id: &ProjectId) -> Result<Project> {
        let builder = self.request(reqwest::Method::GET, &format!("/api/projects/{}", id));
        self.send_json(builder)
            .await
            .map_err(|e| not_found_as(e, id))
    }

    async fn save(&self, id: &ProjectId, update: ProjectUpdate) -> Result<Project> {
        let builder = self
            .request(reqwest::Method::PUT, &format!("/api/projects/{}", id))
            .json(&update);
        self.send_json(builder)
            .await
            .map_err(|e| not_found_as(e, id))
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool> {
        let builder = self.request(reqwest::Method::DELETE, &format!("/api/projects/{}", id));
        match self.send_json::<serde_json::Value>(builder).await {
            Ok(_) => Ok(true),
            Err(Error::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let id = ProjectId::new("p1");
        let mapped = not_found_as(
            Error::Status {
                status: 404,
                body: "{\"detail\":\"Project not found\"}".into(),
            },
            &id,
        );
        assert!(mapped.is_not_found());

        let kept = not_found_as(
            Error::Status {
                status: 500,
                body: String::new(),
            },
            &id,
        );
        assert!(matches!(kept, Error::Status { status: 500, .. }));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let endpoint = EndpointConfig {
            base_url: "https://aichemy.example/".into(),
            ..Default::default()
        };
        let client = BackendClient::with_client(reqwest::Client::new(), &endpoint);
        assert_eq!(client.url("/api/health"), "https://aichemy.example/api/health");
    }
}
