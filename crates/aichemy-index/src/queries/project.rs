use aichemy_types::{ProjectId, ProjectUpdate};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::Result;
use crate::records::{ProjectRecord, SummaryRecord};

pub fn insert(conn: &Connection, project: &ProjectRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO projects (id, user_id, name, messages, agent_steps, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            project.id.as_str(),
            &project.user_id,
            &project.name,
            &project.messages,
            &project.agent_steps,
            &project.created_at,
            &project.updated_at
        ],
    )?;

    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<ProjectRecord>> {
    let result = conn
        .query_row(
            r#"
        SELECT id, user_id, name, messages, COALESCE(agent_steps, '[]'), created_at, updated_at
        FROM projects
        WHERE id = ?1
        "#,
            [id],
            map_project,
        )
        .optional()?;

    Ok(result)
}

pub fn list_for_owner(conn: &Connection, user_id: &str) -> Result<Vec<SummaryRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, created_at, updated_at
        FROM projects
        WHERE user_id = ?1
        ORDER BY updated_at DESC, rowid DESC
        "#,
    )?;

    let projects = stmt
        .query_map([user_id], |row| {
            Ok(SummaryRecord {
                id: ProjectId::from(row.get::<_, String>(0)?),
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(projects)
}

/// Apply the fields present in `update`, always bumping `updated_at`.
///
/// Returns false when no row has the given id.
pub fn update(
    conn: &Connection,
    id: &str,
    update: &ProjectUpdate,
    updated_at: &str,
) -> Result<bool> {
    let mut assignments = vec!["updated_at = ?"];
    let mut values: Vec<String> = vec![updated_at.to_string()];

    if let Some(name) = &update.name {
        assignments.push("name = ?");
        values.push(name.clone());
    }
    if let Some(messages) = &update.messages {
        assignments.push("messages = ?");
        values.push(serde_json::to_string(messages)?);
    }
    if let Some(steps) = &update.agent_steps {
        assignments.push("agent_steps = ?");
        values.push(serde_json::to_string(steps)?);
    }
    values.push(id.to_string());

    let sql = format!(
        "UPDATE projects SET {} WHERE id = ?",
        assignments.join(", ")
    );
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;

    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

fn map_project(row: &Row<'_>) -> rusqlite::Result<ProjectRecord> {
    Ok(ProjectRecord {
        id: ProjectId::from(row.get::<_, String>(0)?),
        user_id: row.get(1)?,
        name: row.get(2)?,
        messages: row.get(3)?,
        agent_steps: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
