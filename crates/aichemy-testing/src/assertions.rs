//! Assertions over the CLI's `--format json` output.

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert that a project listing holds `expected` entries
pub fn assert_project_count(json: &Value, expected: usize) -> Result<()> {
    let projects = json["content"]["projects"]
        .as_array()
        .context("Expected 'content.projects' array in JSON")?;

    if projects.len() != expected {
        anyhow::bail!("Expected {} projects, got {}", expected, projects.len());
    }
    Ok(())
}

/// Assert the transcript's roles, in order
pub fn assert_roles(json: &Value, expected: &[&str]) -> Result<()> {
    let messages = json["content"]["messages"]
        .as_array()
        .context("Expected 'content.messages' array in JSON")?;
    let roles: Vec<&str> = messages
        .iter()
        .map(|m| m["role"].as_str().unwrap_or("?"))
        .collect();

    if roles != expected {
        anyhow::bail!("Expected roles {:?}, got {:?}", expected, roles);
    }
    Ok(())
}

/// Id of the first listed project
pub fn first_project_id(json: &Value) -> Result<String> {
    json["content"]["projects"][0]["id"]
        .as_str()
        .map(str::to_string)
        .context("Expected 'content.projects[0].id' in JSON")
}
