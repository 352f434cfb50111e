use aichemy_types::{ToolCatalog, ToolInfo};
use std::path::Path;

use crate::Result;

/// Parse a tab-separated tool listing: a header row, then
/// `provider<TAB>tool<TAB>description` rows. Short rows are skipped.
pub fn parse_tools(text: &str) -> ToolCatalog {
    let mut catalog = ToolCatalog::default();
    for (line_no, line) in text.lines().enumerate().skip(1) {
        let parts: Vec<&str> = line.trim().split('\t').collect();
        if parts.len() < 3 {
            if !line.trim().is_empty() {
                tracing::debug!(line = line_no + 1, "skipping short tool row");
            }
            continue;
        }
        catalog.push(
            parts[0],
            ToolInfo {
                name: parts[1].to_string(),
                description: parts[2].to_string(),
            },
        );
    }
    catalog
}

/// Load the tool listing at `path`; a missing file is an empty catalog
pub fn load_tools(path: &Path) -> Result<ToolCatalog> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "tool listing not found");
        return Ok(ToolCatalog::default());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_tools(&text))
}
