use aichemy_types::{SkillMeta, ToolCatalog};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct SkillListView {
    pub source: String,
    pub skills: Vec<SkillMeta>,
}

impl fmt::Display for SkillListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skills.is_empty() {
            writeln!(f, "No skills found in {}.", self.source)?;
            return Ok(());
        }
        for skill in &self.skills {
            writeln!(f, "{}  [{}]", skill.label, skill.name)?;
            if !skill.caption.is_empty() {
                writeln!(f, "    {}", skill.caption)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SkillDetailView {
    pub name: String,
    pub prompt: String,
}

impl fmt::Display for SkillDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.prompt)
    }
}

#[derive(Debug, Serialize)]
pub struct ToolListView {
    pub source: String,
    pub tools: ToolCatalog,
}

impl fmt::Display for ToolListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tools.is_empty() {
            writeln!(f, "No tools listed in {}.", self.source)?;
            return Ok(());
        }
        for group in &self.tools.groups {
            writeln!(f, "{} ({})", group.provider, group.tools.len())?;
            for tool in &group.tools {
                writeln!(f, "  {:<32} {}", tool.name, tool.description)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ExampleListView {
    pub examples: Vec<String>,
}

impl fmt::Display for ExampleListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Try these example questions:")?;
        for (i, question) in self.examples.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, question)?;
        }
        Ok(())
    }
}
