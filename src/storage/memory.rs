//! In-memory project store.
//!
//! Keeps projects in a map guarded by a mutex and records every call made
//! against it, in order. Individual operations can be armed to fail once
//! with `RemoteUnavailable`, which makes retry and partial-save behaviour
//! observable without a network.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::project_store::ProjectStore;
use crate::error::{Error, Result};
use crate::model::{OwnerId, Project, ProjectId};

/// Store operation kinds, used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Exists,
    GetTitle,
    GetItems,
    UpdateTitle,
    UpdateItems,
}

/// One recorded call against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create {
        title: String,
        items: Vec<String>,
        owner: OwnerId,
    },
    Exists {
        project: ProjectId,
        owner: OwnerId,
    },
    GetTitle(ProjectId),
    GetItems(ProjectId),
    UpdateTitle {
        project: ProjectId,
        title: String,
    },
    UpdateItems {
        project: ProjectId,
        items: Vec<String>,
    },
}

impl StoreCall {
    #[must_use]
    pub const fn op(&self) -> StoreOp {
        match self {
            Self::Create { .. } => StoreOp::Create,
            Self::Exists { .. } => StoreOp::Exists,
            Self::GetTitle(_) => StoreOp::GetTitle,
            Self::GetItems(_) => StoreOp::GetItems,
            Self::UpdateTitle { .. } => StoreOp::UpdateTitle,
            Self::UpdateItems { .. } => StoreOp::UpdateItems,
        }
    }

    /// Whether this call modifies stored state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self.op(),
            StoreOp::Create | StoreOp::UpdateTitle | StoreOp::UpdateItems
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    projects: HashMap<ProjectId, Project>,
    calls: Vec<StoreCall>,
    fail_once: HashSet<StoreOp>,
}

/// Project store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    inner: Mutex<Inner>,
}

impl MemoryProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project directly, without recording a call.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn insert(&self, project: Project) -> Result<()> {
        self.lock()?.projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Snapshot of a stored project.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn project(&self, id: &ProjectId) -> Result<Option<Project>> {
        Ok(self.lock()?.projects.get(id).cloned())
    }

    /// All calls made so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn calls(&self) -> Result<Vec<StoreCall>> {
        Ok(self.lock()?.calls.clone())
    }

    /// Only the calls that modified state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn write_calls(&self) -> Result<Vec<StoreCall>> {
        Ok(self
            .lock()?
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect())
    }

    /// Forget recorded calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn clear_calls(&self) -> Result<()> {
        self.lock()?.calls.clear();
        Ok(())
    }

    /// Make the next call of kind `op` fail with `RemoteUnavailable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn fail_next(&self, op: StoreOp) -> Result<()> {
        self.lock()?.fail_once.insert(op);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::remote("memory store lock poisoned"))
    }

    /// Record `call`, apply any armed failure, then run `f`.
    fn dispatch<R>(&self, call: StoreCall, f: impl FnOnce(&mut Inner) -> Result<R>) -> Result<R> {
        let mut inner = self.lock()?;
        let op = call.op();
        debug!(?op, "Memory store call");
        inner.calls.push(call);

        if inner.fail_once.remove(&op) {
            return Err(Error::remote(format!("injected failure on {op:?}")));
        }
        f(&mut inner)
    }
}

fn not_found(project: &ProjectId) -> Error {
    Error::ProjectNotFound {
        id: project.to_string(),
    }
}

impl ProjectStore for MemoryProjectStore {
    async fn create(&self, title: &str, items: &[String], owner: &OwnerId) -> Result<ProjectId> {
        let call = StoreCall::Create {
            title: title.to_string(),
            items: items.to_vec(),
            owner: owner.clone(),
        };
        self.dispatch(call, |inner| {
            let project = Project::new(owner.clone(), title.to_string(), items.to_vec());
            let id = project.id.clone();
            inner.projects.insert(id.clone(), project);
            Ok(id)
        })
    }

    async fn exists(&self, project: &ProjectId, owner: &OwnerId) -> Result<bool> {
        let call = StoreCall::Exists {
            project: project.clone(),
            owner: owner.clone(),
        };
        self.dispatch(call, |inner| {
            Ok(inner
                .projects
                .get(project)
                .is_some_and(|p| &p.owner_id == owner))
        })
    }

    async fn get_title(&self, project: &ProjectId) -> Result<String> {
        self.dispatch(StoreCall::GetTitle(project.clone()), |inner| {
            inner
                .projects
                .get(project)
                .map(|p| p.title.clone())
                .ok_or_else(|| not_found(project))
        })
    }

    async fn get_items(&self, project: &ProjectId) -> Result<Vec<String>> {
        self.dispatch(StoreCall::GetItems(project.clone()), |inner| {
            inner
                .projects
                .get(project)
                .map(|p| p.items.clone())
                .ok_or_else(|| not_found(project))
        })
    }

    async fn update_title(&self, project: &ProjectId, title: &str) -> Result<()> {
        let call = StoreCall::UpdateTitle {
            project: project.clone(),
            title: title.to_string(),
        };
        self.dispatch(call, |inner| {
            let stored = inner
                .projects
                .get_mut(project)
                .ok_or_else(|| not_found(project))?;
            stored.title = title.to_string();
            stored.updated_at = chrono::Utc::now().timestamp_millis();
            Ok(())
        })
    }

    async fn update_items(&self, project: &ProjectId, items: &[String]) -> Result<()> {
        let call = StoreCall::UpdateItems {
            project: project.clone(),
            items: items.to_vec(),
        };
        self.dispatch(call, |inner| {
            let stored = inner
                .projects
                .get_mut(project)
                .ok_or_else(|| not_found(project))?;
            stored.items = items.to_vec();
            stored.updated_at = chrono::Utc::now().timestamp_millis();
            Ok(())
        })
    }
}
