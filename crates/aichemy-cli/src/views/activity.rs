use aichemy_runtime::activity::ActivityView;
use aichemy_types::single_line;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ActivityReport {
    pub project_id: String,
    pub project_name: String,
    #[serde(flatten)]
    pub activity: ActivityView,
}

impl fmt::Display for ActivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Agent activity: {}", self.project_name)?;

        if self.activity.is_empty() {
            writeln!(f)?;
            writeln!(f, "No agent activity yet.")?;
            return Ok(());
        }

        for group in &self.activity.tool_groups {
            writeln!(f)?;
            writeln!(f, "Tool calls: {}", group.prompt)?;
            for call in &group.calls {
                writeln!(f, "  {}. 🔧 {}", call.number, call.function_name)?;
                for (name, value) in &call.parameters {
                    writeln!(f, "       {}: {}", name, single_line(value))?;
                }
                if let Some(rationale) = &call.rationale {
                    writeln!(f, "       > {}", single_line(rationale))?;
                }
            }
        }

        for group in &self.activity.query_groups {
            for result in &group.results {
                writeln!(f)?;
                writeln!(f, "SQL: {}", group.prompt)?;
                if let Some(description) = &result.description {
                    writeln!(f, "  {}", single_line(description))?;
                }
                if let Some(query) = &result.query {
                    for line in query.lines() {
                        writeln!(f, "  {}", line)?;
                    }
                }
            }
        }
        Ok(())
    }
}
