//! Skill documents on disk: `<skills_dir>/<name>/SKILL.md` with YAML front
//! matter and optional `references/*.md` attachments.

use aichemy_types::{SkillCatalog, SkillMeta};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::Result;

pub const SKILL_FILE: &str = "SKILL.md";

const CAPTION_MAX: usize = 70;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n").unwrap());
static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^---\s*\n.*?\n---\s*\n(.*)$").unwrap());
static USER_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<user_request>\s*(.*?)\s*</user_request>").unwrap());

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn parse_frontmatter(content: &str) -> Frontmatter {
    let Some(yaml) = FRONTMATTER.captures(content).and_then(|c| c.get(1)) else {
        return Frontmatter::default();
    };
    match serde_yaml::from_str::<Option<Frontmatter>>(yaml.as_str()) {
        Ok(fm) => fm.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed skill front matter");
            Frontmatter::default()
        }
    }
}

/// Title-case words, leaving all-caps words such as "ADME" alone
fn smart_title(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let has_cased = word.chars().any(char::is_alphabetic);
            if has_cased && !word.chars().any(char::is_lowercase) {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display label and sort order derived from the skill name
pub fn label_and_order(name: &str) -> (String, u32) {
    let lower = name.to_lowercase();
    let (icon, order) = if lower.contains("target") {
        ("🎯", 0)
    } else if lower.contains("hit") {
        ("⌬", 1)
    } else if lower.contains("adme") {
        ("🧪", 2)
    } else if lower.contains("safety") {
        ("☠️", 3)
    } else {
        ("📋", 4)
    };
    (format!("{} {}", icon, smart_title(&name.replace('-', " "))), order)
}

/// First sentence of the description, capped for one-line display
pub fn caption(description: &str) -> String {
    let first = description.split(". ").next().unwrap_or_default();
    if first.chars().count() > CAPTION_MAX {
        let head: String = first.chars().take(CAPTION_MAX - 3).collect();
        format!("{}...", head)
    } else {
        first.to_string()
    }
}

fn read_meta(folder: &Path) -> Option<SkillMeta> {
    let skill_file = folder.join(SKILL_FILE);
    let content = match std::fs::read_to_string(&skill_file) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %skill_file.display(), error = %e, "skipping skill folder");
            return None;
        }
    };
    let fm = parse_frontmatter(&content);
    let folder_name = folder.file_name()?.to_string_lossy().into_owned();
    let name = fm.name.unwrap_or(folder_name);
    let description = fm.description.unwrap_or_default();
    let (label, order) = label_and_order(&name);

    Some(SkillMeta {
        caption: caption(&description),
        name,
        description,
        path: folder.to_path_buf(),
        label,
        order,
    })
}

/// Scan the immediate subfolders of `skills_dir` for skill documents.
/// A missing directory yields an empty catalog.
pub fn discover(skills_dir: &Path) -> SkillCatalog {
    if !skills_dir.exists() {
        tracing::debug!(path = %skills_dir.display(), "skills directory not found");
        return SkillCatalog::default();
    }

    let mut skills: Vec<SkillMeta> = Vec::new();
    for entry in WalkDir::new(skills_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(meta) = read_meta(entry.path()) {
            skills.retain(|s| s.name != meta.name);
            skills.push(meta);
        }
    }
    SkillCatalog::new(skills)
}

/// A skill document with its reference attachments
#[derive(Debug, Clone, PartialEq)]
pub struct SkillContent {
    pub name: String,
    pub body: String,
    /// (file name, content), sorted by file name
    pub references: Vec<(String, String)>,
}

impl SkillContent {
    /// Instruction block handed to the agent
    pub fn full_prompt(&self) -> String {
        let mut prompt = format!("# Skill: {}\n\n{}", self.name, self.body);
        if !self.references.is_empty() {
            prompt.push_str("\n\n---\n\n## Reference Materials\n\n");
            for (name, content) in &self.references {
                prompt.push_str(&format!("### {}\n\n{}\n\n", name, content));
            }
        }
        prompt
    }
}

/// Load `<skills_dir>/<skill_name>/SKILL.md`; `None` when there is no such skill
pub fn load_skill_content(skills_dir: &Path, skill_name: &str) -> Result<Option<SkillContent>> {
    let skill_path: PathBuf = skills_dir.join(skill_name);
    let skill_file = skill_path.join(SKILL_FILE);
    if !skill_file.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&skill_file)?;
    let fm = parse_frontmatter(&content);
    let body = match BODY.captures(&content).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim().to_string(),
        None => content.clone(),
    };

    let mut references = Vec::new();
    let refs_dir = skill_path.join("references");
    if refs_dir.is_dir() {
        for entry in WalkDir::new(&refs_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(text) => references.push((entry.file_name().to_string_lossy().into_owned(), text)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "unreadable skill reference"),
            }
        }
    }

    Ok(Some(SkillContent {
        name: fm.name.unwrap_or_else(|| skill_name.to_string()),
        body,
        references,
    }))
}

/// Wrap a user query in the instructions of `skill_name`. The query is
/// returned unchanged when the skill cannot be loaded.
pub fn build_prompt_with_skill(user_query: &str, skill_name: &str, skills_dir: &Path) -> String {
    let skill = match load_skill_content(skills_dir, skill_name) {
        Ok(Some(skill)) => skill,
        Ok(None) => {
            tracing::warn!(skill = skill_name, "skill not found, sending plain query");
            return user_query.to_string();
        }
        Err(e) => {
            tracing::warn!(skill = skill_name, error = %e, "failed to load skill, sending plain query");
            return user_query.to_string();
        }
    };

    format!(
        "You have been given a specialized skill to help with this task. \
         Follow the workflow instructions carefully.\n\n\
         <skill_instructions>\n{}\n</skill_instructions>\n\n\
         <user_request>\n{}\n</user_request>\n\n\
         Execute the skill workflow to address the user's request. \
         Follow each step methodically and provide the expected output format.",
        skill.full_prompt(),
        user_query
    )
}

/// The user's own words from a skill-wrapped prompt, or the prompt itself
pub fn extract_user_request(prompt: &str) -> &str {
    USER_REQUEST
        .captures(prompt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_skill(root: &Path, folder: &str, front: &str, body: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SKILL_FILE), format!("---\n{}\n---\n{}", front, body)).unwrap();
    }

    #[test]
    fn test_labels() {
        assert_eq!(label_and_order("ADME-assessment"), ("🧪 ADME Assessment".to_string(), 2));
        assert_eq!(label_and_order("target-identification").1, 0);
        assert_eq!(label_and_order("literature-review"), ("📋 Literature Review".to_string(), 4));
    }

    #[test]
    fn test_caption_first_sentence_and_cap() {
        assert_eq!(caption("Find targets. Then rank them."), "Find targets");
        let long = "x".repeat(80);
        let capped = caption(&long);
        assert_eq!(capped.chars().count(), 70);
        assert!(capped.ends_with("..."));
        assert_eq!(caption(""), "");
    }

    #[test]
    fn test_discover_orders_by_kind() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "safety", "name: safety-assessment\ndescription: Assess safety. More.", "body");
        write_skill(dir.path(), "target", "name: target-identification\ndescription: Find targets.", "body");
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("README.md"), "not a skill").unwrap();

        let catalog = discover(dir.path());
        let names: Vec<_> = catalog.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["target-identification", "safety-assessment"]);
        assert_eq!(catalog.captions(), vec!["Find targets.", "Assess safety"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_load_with_references() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "hit-identification", "name: hit-identification", "\nSteps here.\n");
        let refs = dir.path().join("hit-identification/references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("tools.md"), "tool list").unwrap();
        fs::write(refs.join("notes.txt"), "ignored").unwrap();

        let skill = load_skill_content(dir.path(), "hit-identification")
            .unwrap()
            .unwrap();
        assert_eq!(skill.body, "Steps here.");
        assert_eq!(skill.references.len(), 1);
        assert_eq!(
            skill.full_prompt(),
            "# Skill: hit-identification\n\nSteps here.\n\n---\n\n## Reference Materials\n\n### tools.md\n\ntool list\n\n"
        );

        assert!(load_skill_content(dir.path(), "missing").unwrap().is_none());
    }

    #[test]
    fn test_wrap_and_extract() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "safety-assessment", "name: safety-assessment", "Do it.");

        let wrapped = build_prompt_with_skill("Find safety profile of X.", "safety-assessment", dir.path());
        assert!(wrapped.contains("<skill_instructions>\n# Skill: safety-assessment\n\nDo it.\n</skill_instructions>"));
        assert_eq!(extract_user_request(&wrapped), "Find safety profile of X.");

        assert_eq!(build_prompt_with_skill("plain", "missing", dir.path()), "plain");
        assert_eq!(extract_user_request("plain"), "plain");
    }
}
