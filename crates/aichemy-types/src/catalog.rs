use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One tool the agent can call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Tools offered by one provider (sub-agent or MCP server)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolGroup {
    pub provider: String,
    pub tools: Vec<ToolInfo>,
}

/// Tool catalog grouped by provider, in first-seen order.
///
/// Wire form is a JSON object `{provider: [{name, description}]}`; an empty
/// list is accepted as an empty catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCatalog {
    pub groups: Vec<ToolGroup>,
}

impl ToolCatalog {
    /// Append a tool under `provider`, creating the group on first use
    pub fn push(&mut self, provider: &str, tool: ToolInfo) {
        match self.groups.iter_mut().find(|g| g.provider == provider) {
            Some(group) => group.tools.push(tool),
            None => self.groups.push(ToolGroup {
                provider: provider.to_string(),
                tools: vec![tool],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn tool_count(&self) -> usize {
        self.groups.iter().map(|g| g.tools.len()).sum()
    }
}

impl Serialize for ToolCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.provider, &group.tools)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ToolCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut catalog = ToolCatalog::default();
        if let Value::Object(map) = value {
            for (provider, tools) in map {
                let tools: Vec<ToolInfo> =
                    serde_json::from_value(tools).map_err(serde::de::Error::custom)?;
                for tool in tools {
                    catalog.push(&provider, tool);
                }
            }
        }
        Ok(catalog)
    }
}

/// Metadata of one discovered skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMeta {
    /// Skill identifier (front matter `name`, or the folder name)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub path: PathBuf,
    pub label: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub order: u32,
}

/// Skills sorted by display order.
///
/// Wire form: `{"skills": {name: meta}, "labels": [...], "captions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillCatalog {
    pub skills: Vec<SkillMeta>,
}

impl SkillCatalog {
    /// Build a catalog, sorting by order then name
    pub fn new(mut skills: Vec<SkillMeta>) -> Self {
        skills.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Self { skills }
    }

    pub fn get(&self, name: &str) -> Option<&SkillMeta> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn captions(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.caption.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Serialize for SkillCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut skills = Map::new();
        for meta in &self.skills {
            let value = serde_json::to_value(meta).map_err(serde::ser::Error::custom)?;
            skills.insert(meta.name.clone(), value);
        }
        let wire = serde_json::json!({
            "skills": skills,
            "labels": self.labels(),
            "captions": self.captions(),
        });
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SkillCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            skills: Map<String, Value>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let mut skills = Vec::with_capacity(wire.skills.len());
        for (name, value) in wire.skills {
            let mut meta: SkillMeta =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            if meta.name.is_empty() {
                meta.name = name;
            }
            skills.push(meta);
        }
        Ok(SkillCatalog::new(skills))
    }
}

/// Identity of the signed-in user as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Backend health report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Active storage backend ("sqlite", ...)
    pub db_backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_catalog_keeps_provider_order() {
        let raw = r#"{"pubchem": [{"name": "get_cid", "description": "Look up CID"}],
                      "opentargets": [{"name": "search", "description": "Search"}, {"name": "assoc", "description": ""}]}"#;
        let catalog: ToolCatalog = serde_json::from_str(raw).unwrap();
        let providers: Vec<_> = catalog.groups.iter().map(|g| g.provider.as_str()).collect();
        assert_eq!(providers, vec!["pubchem", "opentargets"]);
        assert_eq!(catalog.tool_count(), 3);

        let empty: ToolCatalog = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_skill_catalog_wire_round_trip() {
        let catalog = SkillCatalog::new(vec![
            SkillMeta {
                name: "safety-assessment".into(),
                description: "Assess safety.".into(),
                path: PathBuf::from("/skills/safety-assessment"),
                label: "☠️ Safety Assessment".into(),
                caption: "Assess safety.".into(),
                order: 3,
            },
            SkillMeta {
                name: "target-identification".into(),
                description: "Find targets".into(),
                path: PathBuf::from("/skills/target-identification"),
                label: "🎯 Target Identification".into(),
                caption: "Find targets".into(),
                order: 0,
            },
        ]);
        assert_eq!(catalog.skills[0].name, "target-identification");

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["labels"][1], "☠️ Safety Assessment");

        let back: SkillCatalog = serde_json::from_value(value).unwrap();
        assert_eq!(back, catalog);
    }
}
