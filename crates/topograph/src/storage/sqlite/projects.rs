//! Project CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::helpers::{PROJECTS_COLUMNS, format_timestamp, row_to_project};
use super::SqliteStore;
use crate::domain::{Project, ProjectId};
use crate::error::Result;

impl SqliteStore {
    pub(crate) fn try_get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        let conn = self.connection()?;

        conn.query_row(
            &format!("SELECT {PROJECTS_COLUMNS} FROM projects WHERE id = ?1"),
            [id.as_str()],
            row_to_project,
        )
        .optional()
        .map_err(Into::into)
    }

    pub(crate) fn try_get_projects(&self) -> Result<Vec<Project>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {PROJECTS_COLUMNS} FROM projects ORDER BY rowid"))?;

        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    pub(crate) fn try_project_exists(&self, id: &ProjectId) -> Result<bool> {
        let conn = self.connection()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub(crate) fn try_insert_project(&self, project: &Project) -> Result<bool> {
        project.validate()?;
        let data = serde_json::to_string(&project.data)?;
        let conn = self.connection()?;

        let inserted = conn.execute(
            "INSERT INTO projects (id, name, author, created_at, updated_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project.id.as_str(),
                project.name,
                project.author.as_str(),
                format_timestamp(&project.created_at),
                format_timestamp(&project.updated_at),
                data
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Author and creation time are immutable; everything else is replaced.
    pub(crate) fn try_update_project(&self, project: &Project) -> Result<bool> {
        let data = serde_json::to_string(&project.data)?;
        let conn = self.connection()?;

        let changed = conn.execute(
            "UPDATE projects SET name = ?2, updated_at = ?3, data = ?4 WHERE id = ?1",
            params![
                project.id.as_str(),
                project.name,
                format_timestamp(&project.updated_at),
                data
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn try_delete_project(&self, id: &ProjectId) -> Result<bool> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [id.as_str()])?;
        Ok(deleted > 0)
    }
}
