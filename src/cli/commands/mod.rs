//! Command implementations.
//!
//! Every invocation restores the session from the workspace file, applies
//! one command, and writes the workspace back.

pub mod completions;
pub mod export;
pub mod list;
pub mod project;
pub mod settings;
pub mod version;

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{
    load_settings, load_workspace, resolve_db_path, resolve_owner, resolve_settings_path,
    resolve_workspace_path, save_workspace,
};
use crate::error::{Error, Result};
use crate::model::OwnerId;
use crate::session::Session;
use crate::storage::SqliteProjectStore;

/// Global options shared by all commands.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub db: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub owner: Option<OwnerId>,
    pub json: bool,
}

impl RunContext {
    #[must_use]
    pub fn new(
        db: Option<&Path>,
        workspace: Option<&Path>,
        owner: Option<&str>,
        json: bool,
    ) -> Self {
        Self {
            db: db.map(Path::to_path_buf),
            workspace: workspace.map(Path::to_path_buf),
            owner: resolve_owner(owner),
            json,
        }
    }

    fn workspace_path(&self) -> Result<PathBuf> {
        resolve_workspace_path(self.workspace.as_deref())
            .ok_or_else(|| Error::Config("Could not determine workspace location".into()))
    }

    /// Restore the session saved by the previous invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace or settings file cannot be read.
    pub fn load_session(&self) -> Result<Session> {
        let workspace = load_workspace(&self.workspace_path()?)?;
        let preferences = match resolve_settings_path() {
            Some(path) => load_settings(&path)?.preferences(),
            None => crate::session::Preferences::default(),
        };

        Ok(Session::restore(self.owner.clone(), workspace).with_preferences(preferences))
    }

    /// Persist the session for the next invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace file cannot be written.
    pub fn store_session(&self, session: &Session) -> Result<()> {
        save_workspace(&self.workspace_path()?, &session.to_workspace())
    }

    /// Open the project store.
    ///
    /// # Errors
    ///
    /// Returns `RemoteUnavailable` if the database cannot be opened.
    pub fn open_store(&self) -> Result<SqliteProjectStore> {
        let path = resolve_db_path(self.db.as_deref())
            .ok_or_else(|| Error::Config("Could not determine database location".into()))?;
        debug!(path = %path.display(), "Opening project store");
        SqliteProjectStore::open(&path).map_err(Error::into_remote)
    }
}

/// Run a future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    Ok(rt.block_on(future))
}

/// Convert a 1-based CLI position to a list index.
pub(crate) fn to_index(position: u32) -> Result<usize> {
    position
        .checked_sub(1)
        .map(|i| i as usize)
        .ok_or_else(|| Error::InvalidArgument("Positions start at 1".into()))
}

/// Print a JSON payload on one line.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
