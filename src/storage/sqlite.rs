//! SQLite project store.
//!
//! Durable [`ProjectStore`] backend. Every write runs inside an IMMEDIATE
//! transaction through [`SqliteProjectStore::mutate`], which also appends the
//! audit events collected by the mutation. Infrastructure errors are
//! converted to `RemoteUnavailable` at the trait boundary.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Transaction};
use tracing::{debug, info};

use super::events::{Event, EventType, insert_event};
use super::project_store::ProjectStore;
use super::schema::apply_schema;
use crate::error::{Error, Result};
use crate::model::{OwnerId, Project, ProjectId};
use crate::sync::{items_hash, short_hash};

/// Busy timeout for the shared database file, in milliseconds.
const BUSY_TIMEOUT_MS: u64 = 5000;

/// SQLite-based project store.
#[derive(Debug)]
pub struct SqliteProjectStore {
    conn: Mutex<Connection>,
}

/// Context for a mutation, collecting audit events.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Owner performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        project_id: &str,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
        comment: Option<&str>,
    ) {
        let mut event = Event::new("project", project_id, event_type, &self.actor)
            .with_values(old_value, new_value);
        if let Some(comment) = comment {
            event = event.with_comment(comment);
        }
        self.events.push(event);
    }
}

impl SqliteProjectStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        apply_schema(&conn)?;

        debug!(path = %path.display(), "Opened project store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::remote("project store connection lock poisoned"))
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);
        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;
        debug!(op = %ctx.op_name, events = ctx.events.len(), "Committed mutation");
        Ok(result)
    }

    // ==================
    // Project Operations
    // ==================

    /// Insert a new project with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_project(&self, project: &Project) -> Result<()> {
        self.mutate("create_project", project.owner_id.as_str(), |tx, ctx| {
            tx.execute(
                "INSERT INTO projects (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    project.id.as_str(),
                    project.owner_id.as_str(),
                    project.title,
                    project.created_at,
                    project.updated_at,
                ],
            )?;
            write_items(tx, &project.id, &project.items)?;

            ctx.record_change(
                project.id.as_str(),
                EventType::ProjectCreated,
                None,
                Some(items_hash(&project.items)),
                Some(&format!("{} references", project.items.len())),
            );
            Ok(())
        })?;

        info!(project = %project.id, items = project.items.len(), "Created project");
        Ok(())
    }

    /// Get a project with its items by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        let conn = self.lock()?;
        let project = conn
            .query_row(
                "SELECT id, owner_id, title, created_at, updated_at FROM projects WHERE id = ?1",
                [id.as_str()],
                map_project_row,
            )
            .optional()?;

        match project {
            Some(mut project) => {
                project.items = read_items(&conn, id)?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// List an owner's projects, most recently updated first.
    ///
    /// Items are loaded for each project.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_projects(&self, owner: &OwnerId, limit: usize) -> Result<Vec<Project>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, title, created_at, updated_at
             FROM projects
             WHERE owner_id = ?1
             ORDER BY updated_at DESC, id ASC
             LIMIT ?2",
        )?;

        let mut projects = stmt
            .query_map(
                rusqlite::params![owner.as_str(), i64::try_from(limit).unwrap_or(i64::MAX)],
                map_project_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for project in &mut projects {
            project.items = read_items(&conn, &project.id)?;
        }
        Ok(projects)
    }

    fn project_exists_for(&self, id: &ProjectId, owner: &OwnerId) -> Result<bool> {
        let conn = self.lock()?;
        let exists = conn
            .prepare("SELECT 1 FROM projects WHERE id = ?1 AND owner_id = ?2")?
            .exists([id.as_str(), owner.as_str()])?;
        Ok(exists)
    }

    fn title_of(&self, id: &ProjectId) -> Result<String> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT title FROM projects WHERE id = ?1",
            [id.as_str()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| not_found(id))
    }

    fn items_of(&self, id: &ProjectId) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let exists = conn
            .prepare("SELECT 1 FROM projects WHERE id = ?1")?
            .exists([id.as_str()])?;
        if !exists {
            return Err(not_found(id));
        }
        Ok(read_items(&conn, id)?)
    }

    /// Overwrite a project's title.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project doesn't exist, or an error if
    /// the update fails.
    pub fn set_title(&self, id: &ProjectId, title: &str) -> Result<()> {
        let actor = self.owner_of(id)?;
        self.mutate("update_title", &actor, |tx, ctx| {
            let old: String = tx
                .query_row(
                    "SELECT title FROM projects WHERE id = ?1",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| not_found(id))?;

            tx.execute(
                "UPDATE projects SET title = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![title, chrono::Utc::now().timestamp_millis(), id.as_str()],
            )?;

            ctx.record_change(
                id.as_str(),
                EventType::TitleUpdated,
                Some(old),
                Some(title.to_string()),
                None,
            );
            Ok(())
        })?;

        info!(project = %id, "Updated project title");
        Ok(())
    }

    /// Replace a project's items.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project doesn't exist, or an error if
    /// the update fails.
    pub fn set_items(&self, id: &ProjectId, items: &[String]) -> Result<()> {
        let actor = self.owner_of(id)?;
        self.mutate("update_items", &actor, |tx, ctx| {
            let old_hash = items_hash(&read_items(tx, id)?);

            let affected = tx.execute(
                "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![chrono::Utc::now().timestamp_millis(), id.as_str()],
            )?;
            if affected == 0 {
                return Err(not_found(id));
            }

            tx.execute(
                "DELETE FROM project_items WHERE project_id = ?1",
                [id.as_str()],
            )?;
            write_items(tx, id, items)?;

            ctx.record_change(
                id.as_str(),
                EventType::ItemsUpdated,
                Some(old_hash),
                Some(items_hash(items)),
                Some(&format!("{} references", items.len())),
            );
            Ok(())
        })?;

        info!(project = %id, items = items.len(), hash = short_hash(&items_hash(items)), "Updated project items");
        Ok(())
    }

    fn owner_of(&self, id: &ProjectId) -> Result<String> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT owner_id FROM projects WHERE id = ?1",
            [id.as_str()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| not_found(id))
    }

    /// Audit events recorded for a project, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn project_events(&self, id: &ProjectId, limit: Option<u32>) -> Result<Vec<Event>> {
        let conn = self.lock()?;
        Ok(super::events::get_events(&conn, "project", id.as_str(), limit)?)
    }
}

impl ProjectStore for SqliteProjectStore {
    async fn create(&self, title: &str, items: &[String], owner: &OwnerId) -> Result<ProjectId> {
        let project = Project::new(owner.clone(), title.to_string(), items.to_vec());
        self.create_project(&project)
            .map(|()| project.id)
            .map_err(Error::into_remote)
    }

    async fn exists(&self, project: &ProjectId, owner: &OwnerId) -> Result<bool> {
        self.project_exists_for(project, owner)
            .map_err(Error::into_remote)
    }

    async fn get_title(&self, project: &ProjectId) -> Result<String> {
        self.title_of(project).map_err(Error::into_remote)
    }

    async fn get_items(&self, project: &ProjectId) -> Result<Vec<String>> {
        self.items_of(project).map_err(Error::into_remote)
    }

    async fn update_title(&self, project: &ProjectId, title: &str) -> Result<()> {
        self.set_title(project, title).map_err(Error::into_remote)
    }

    async fn update_items(&self, project: &ProjectId, items: &[String]) -> Result<()> {
        self.set_items(project, items).map_err(Error::into_remote)
    }
}

fn not_found(id: &ProjectId) -> Error {
    Error::ProjectNotFound { id: id.to_string() }
}

fn read_items(conn: &Connection, id: &ProjectId) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT content FROM project_items WHERE project_id = ?1 ORDER BY position ASC",
    )?;
    stmt.query_map([id.as_str()], |row| row.get(0))?
        .collect()
}

fn write_items(tx: &Transaction, id: &ProjectId, items: &[String]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO project_items (project_id, position, content) VALUES (?1, ?2, ?3)",
    )?;
    for (position, content) in items.iter().enumerate() {
        stmt.execute(rusqlite::params![
            id.as_str(),
            i64::try_from(position).unwrap_or(i64::MAX),
            content
        ])?;
    }
    Ok(())
}

fn map_project_row(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId::from(row.get::<_, String>(0)?),
        owner_id: OwnerId::from(row.get::<_, String>(1)?),
        title: row.get(2)?,
        items: Vec::new(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
