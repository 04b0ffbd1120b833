//! Project session: the ordered list bound to an optional remote project.
//!
//! A [`Session`] owns the list, the project title, the baseline snapshot and
//! the lifecycle state. List edits are synchronous. Loading and saving are
//! split into phases so the remote call can run without holding the session:
//!
//! ```text
//! begin_load ─► LoadTicket::fetch(store).await ─► finish_load
//! begin_save ─► SaveTicket::execute(store).await ─► finish_save
//! ```
//!
//! Every ticket carries the transition generation and project id it was
//! issued for. Closing, switching projects or signing out bumps the
//! generation, and a result arriving for an older generation is discarded.
//!
//! A save requested while another is in flight is coalesced: it is recorded
//! once and reported back from `finish_save`, so the caller runs a single
//! trailing save against the baseline the first save established.

mod state;
mod workspace;

pub use state::{SessionEvent, SessionState};
pub use workspace::Workspace;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::list::{self, Export, InsertMode, OrderedList};
use crate::model::{ItemId, OwnerId, ProjectId, ReferenceItem, Snapshot, display_title};
use crate::storage::ProjectStore;
use crate::sync::{SaveFailure, SavePlan, SaveReport, SyncDiff, diff, execute_plan, plan_save};

/// User toggles that shape list edits and exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Where added and imported entries go
    pub insert_mode: InsertMode,
    /// Produce the HTML rendering alongside plain text on export
    pub copy_with_links: bool,
}

type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// An editing session over one ordered reference list.
pub struct Session {
    owner: Option<OwnerId>,
    project_id: Option<ProjectId>,
    title: String,
    list: OrderedList,
    baseline: Option<Snapshot>,
    state: SessionState,
    generation: u64,
    save_queued: bool,
    preferences: Preferences,
    observers: Vec<Observer>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner)
            .field("project_id", &self.project_id)
            .field("title", &self.title)
            .field("items", &self.list.len())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// A load in progress.
#[derive(Debug, Clone)]
#[must_use = "a load ticket must be fetched and handed back to finish_load"]
pub struct LoadTicket {
    generation: u64,
    project_id: ProjectId,
    owner: OwnerId,
}

impl LoadTicket {
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Read the project from the store.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project does not exist for the
    /// ticket's owner, or the store's error.
    pub async fn fetch<S: ProjectStore>(&self, store: &S) -> Result<Snapshot> {
        if !store.exists(&self.project_id, &self.owner).await? {
            return Err(Error::ProjectNotFound {
                id: self.project_id.to_string(),
            });
        }
        let title = store.get_title(&self.project_id).await?;
        let items = store.get_items(&self.project_id).await?;
        Ok(Snapshot::new(title, items))
    }
}

/// A save in progress.
#[derive(Debug, Clone)]
#[must_use = "a save ticket must be executed and handed back to finish_save"]
pub struct SaveTicket {
    generation: u64,
    project_id: Option<ProjectId>,
    owner: OwnerId,
    baseline: Option<Snapshot>,
    plan: SavePlan,
}

impl SaveTicket {
    #[must_use]
    pub const fn plan(&self) -> &SavePlan {
        &self.plan
    }

    /// Issue the planned store writes.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveFailure`] describing what was committed before the
    /// failing call.
    pub async fn execute<S: ProjectStore>(
        &self,
        store: &S,
    ) -> std::result::Result<SaveReport, SaveFailure> {
        execute_plan(store, &self.owner, &self.plan).await
    }
}

/// Result of [`Session::begin_save`].
#[derive(Debug)]
pub enum SaveStart {
    /// Writes are needed; run the ticket.
    Started(SaveTicket),
    /// Nothing differs from the baseline; no store call is needed.
    Unchanged,
    /// A save is already in flight; one trailing save was requested.
    Queued,
}

/// Whether a load result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The session moved on before the result arrived
    Discarded,
}

/// Whether a save result was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        report: SaveReport,
        /// A trailing save was requested while this one ran
        trailing: bool,
    },
    /// The session moved on before the result arrived
    Discarded,
}

impl Session {
    /// Create an empty session with no open project.
    #[must_use]
    pub fn new(owner: Option<OwnerId>) -> Self {
        Self {
            owner,
            project_id: None,
            title: String::new(),
            list: OrderedList::new(),
            baseline: None,
            state: SessionState::Anonymous,
            generation: 0,
            save_queued: false,
            preferences: Preferences::default(),
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Rebuild a session from a workspace record.
    ///
    /// The project is kept only when it was opened under the same owner;
    /// otherwise the list and title survive as local, unsaved edits.
    #[must_use]
    pub fn restore(owner: Option<OwnerId>, workspace: Workspace) -> Self {
        let mut session = Self::new(owner);
        session.title = workspace.title;
        session.list = workspace.items;

        let same_owner = session.owner.is_some() && session.owner == workspace.owner;
        if let (Some(project_id), true) = (workspace.project_id, same_owner) {
            session.project_id = Some(project_id);
            session.baseline = workspace.baseline;
            session.state = SessionState::Ready;
        }

        debug!(
            project = ?session.project_id,
            items = session.list.len(),
            state = %session.state,
            "Restored session"
        );
        session
    }

    /// Settled state of the session, for persisting between processes.
    #[must_use]
    pub fn to_workspace(&self) -> Workspace {
        let project_id = match self.state {
            SessionState::Loading => None,
            _ => self.project_id.clone(),
        };
        let baseline = project_id.as_ref().and(self.baseline.clone());

        Workspace {
            owner: project_id.as_ref().and(self.owner.clone()),
            project_id,
            title: self.title.clone(),
            items: self.list.clone(),
            baseline,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title for display, with the placeholder for a blank title.
    #[must_use]
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    #[must_use]
    pub const fn list(&self) -> &OrderedList {
        &self.list
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    #[must_use]
    pub const fn preferences(&self) -> Preferences {
        self.preferences
    }

    /// Current `{title, items}` in persisted form.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.title, self.list.items())
    }

    /// Fields that differ from the baseline.
    ///
    /// Without a baseline every field counts as changed.
    #[must_use]
    pub fn pending_changes(&self) -> SyncDiff {
        self.baseline
            .as_ref()
            .map_or_else(SyncDiff::full, |b| diff(&self.snapshot(), b))
    }

    /// Whether there are edits the project store has not seen.
    ///
    /// A session without a project is dirty once it has any content.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match &self.baseline {
            Some(baseline) => !diff(&self.snapshot(), baseline).is_empty(),
            None if self.project_id.is_some() => true,
            None => !self.list.is_empty() || !self.title.trim().is_empty(),
        }
    }

    // ── Observers and preferences ─────────────────────────────

    /// Register a callback for session events.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    pub fn set_insert_mode(&mut self, mode: InsertMode) {
        self.preferences.insert_mode = mode;
    }

    pub fn set_copy_with_links(&mut self, enabled: bool) {
        self.preferences.copy_with_links = enabled;
    }

    /// Change the signed-in owner.
    ///
    /// Signing out, or switching to a different owner, closes the project.
    pub fn set_owner(&mut self, owner: Option<OwnerId>) {
        if owner == self.owner {
            return;
        }
        if self.project_id.is_some() || self.state.is_in_flight() {
            self.close();
        }
        info!(signed_in = owner.is_some(), "Owner changed");
        self.owner = owner;
    }

    // ── List editing ──────────────────────────────────────────

    /// Add one entry using the current insert mode.
    ///
    /// Returns the new item's id, or `None` for blank content.
    pub fn add(&mut self, content: &str) -> Option<ItemId> {
        let id = self
            .list
            .add(content, self.preferences.insert_mode)?
            .id()
            .clone();
        self.list_changed();
        Some(id)
    }

    /// Parse pasted text and insert the entries as one block.
    ///
    /// Returns the number of entries added.
    pub fn import(&mut self, raw: &str) -> usize {
        let mode = self.preferences.insert_mode;
        let count = self.list.import_many(list::parse(raw, mode), mode);
        if count > 0 {
            self.list_changed();
        }
        count
    }

    /// Remove the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<ReferenceItem> {
        let removed = self.list.remove_at(index)?;
        self.list_changed();
        Ok(removed)
    }

    /// Move the entry at `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if either index is `>= len`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.list.reorder(from, to)?;
        if from != to {
            self.list_changed();
        }
        Ok(())
    }

    /// Apply a drag that may have been cancelled.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if either index is `>= len`.
    pub fn drop_at(&mut self, from: usize, to: Option<usize>) -> Result<()> {
        match to {
            Some(to) => self.reorder(from, to),
            None => Ok(()),
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        if self.list.is_empty() {
            return;
        }
        self.list.clear();
        self.list_changed();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title == self.title {
            return;
        }
        self.title = title;
        self.emit(&SessionEvent::TitleChanged {
            title: self.title.clone(),
        });
    }

    /// Render the list for copying.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the list is empty.
    pub fn export(&self) -> Result<Export> {
        if self.list.is_empty() {
            return Err(Error::InvalidArgument(
                "Nothing to export: the list is empty".to_string(),
            ));
        }
        Ok(list::render(
            self.list.items(),
            self.preferences.copy_with_links,
        ))
    }

    // ── Project lifecycle ─────────────────────────────────────

    /// Close the active project and drop the local list.
    ///
    /// Any load or save still in flight is orphaned; its result will be
    /// discarded.
    pub fn close(&mut self) {
        self.generation += 1;
        self.save_queued = false;

        let had_project = self.project_id.take().is_some();
        self.baseline = None;
        self.title.clear();
        self.list.clear();

        self.set_state(SessionState::Anonymous);
        if had_project {
            self.emit(&SessionEvent::ProjectChanged(None));
        }
        self.list_changed();
        info!("Closed project");
    }

    /// Start loading `project_id`, abandoning whatever was in flight.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no owner is signed in.
    pub fn begin_load(&mut self, project_id: ProjectId) -> Result<LoadTicket> {
        let owner = self.owner.clone().ok_or(Error::AuthRequired)?;

        self.generation += 1;
        self.save_queued = false;
        self.baseline = None;
        self.project_id = Some(project_id.clone());
        self.set_state(SessionState::Loading);
        self.emit(&SessionEvent::ProjectChanged(Some(project_id.clone())));

        debug!(project = %project_id, generation = self.generation, "Loading project");
        Ok(LoadTicket {
            generation: self.generation,
            project_id,
            owner,
        })
    }

    /// Apply the result of a load.
    ///
    /// On success the list and title are replaced, with fresh item ids, and
    /// the baseline is set. On failure the session returns to `Anonymous`
    /// and the local list is left as it was.
    ///
    /// # Errors
    ///
    /// Returns the load error when the result is current.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Snapshot>,
    ) -> Result<LoadOutcome> {
        if !self.is_current(ticket.generation, Some(&ticket.project_id)) {
            warn!(project = %ticket.project_id, "Discarding stale load result");
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(snapshot) => {
                self.list.replace_all(snapshot.items.clone());
                self.title.clone_from(&snapshot.title);
                self.baseline = Some(snapshot);
                self.set_state(SessionState::Ready);

                info!(project = %ticket.project_id, items = self.list.len(), "Loaded project");
                self.emit(&SessionEvent::TitleChanged {
                    title: self.title.clone(),
                });
                self.list_changed();
                Ok(LoadOutcome::Applied)
            }
            Err(error) => {
                warn!(project = %ticket.project_id, %error, "Project load failed");
                self.project_id = None;
                self.baseline = None;
                self.set_state(SessionState::Anonymous);
                self.emit(&SessionEvent::ProjectChanged(None));
                Err(error)
            }
        }
    }

    /// Start a save of the current state.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no owner is signed in, and `SessionBusy`
    /// while a load is in flight. Neither touches the store.
    pub fn begin_save(&mut self) -> Result<SaveStart> {
        let owner = self.owner.clone().ok_or(Error::AuthRequired)?;

        match self.state {
            SessionState::Loading => Err(Error::SessionBusy {
                state: self.state.to_string(),
            }),
            SessionState::Saving => {
                debug!("Save already in flight, queueing trailing save");
                self.save_queued = true;
                Ok(SaveStart::Queued)
            }
            SessionState::Anonymous | SessionState::Ready => {
                let plan = plan_save(
                    self.project_id.as_ref(),
                    self.snapshot(),
                    self.baseline.as_ref(),
                );
                if plan == SavePlan::Unchanged {
                    return Ok(SaveStart::Unchanged);
                }

                let ticket = SaveTicket {
                    generation: self.generation,
                    project_id: self.project_id.clone(),
                    owner,
                    baseline: self.baseline.clone(),
                    plan,
                };
                self.set_state(SessionState::Saving);
                Ok(SaveStart::Started(ticket))
            }
        }
    }

    /// Apply the result of a save.
    ///
    /// The baseline advances to what was committed. Edits made while the
    /// save was in flight stay pending.
    ///
    /// # Errors
    ///
    /// Returns the store error when the result is current. A trailing save
    /// queued behind a failed save is dropped.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: std::result::Result<SaveReport, SaveFailure>,
    ) -> Result<SaveOutcome> {
        if !self.is_current(ticket.generation, ticket.project_id.as_ref()) {
            warn!(project = ?ticket.project_id, "Discarding stale save result");
            return Ok(SaveOutcome::Discarded);
        }

        let (report, error) = match result {
            Ok(report) => (report, None),
            Err(failure) => (failure.committed, Some(failure.error)),
        };

        self.baseline = report.advance(ticket.baseline.as_ref(), &ticket.plan);
        if let Some(id) = &report.created {
            self.project_id = Some(id.clone());
            self.emit(&SessionEvent::ProjectChanged(Some(id.clone())));
        }

        let next = if self.project_id.is_some() {
            SessionState::Ready
        } else {
            SessionState::Anonymous
        };
        self.set_state(next);

        let trailing = std::mem::take(&mut self.save_queued);
        if let Some(error) = error {
            return Err(error);
        }

        self.emit(&SessionEvent::Saved(report.clone()));
        Ok(SaveOutcome::Saved { report, trailing })
    }

    /// Load `project_id` from `store` and apply the result.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `ProjectNotFound`, or the store's error.
    pub async fn open<S: ProjectStore>(
        &mut self,
        store: &S,
        project_id: ProjectId,
    ) -> Result<LoadOutcome> {
        let ticket = self.begin_load(project_id)?;
        let result = ticket.fetch(store).await;
        self.finish_load(ticket, result)
    }

    /// Save to `store`, running any trailing save that was queued.
    ///
    /// Returns the combined report; `remote_calls` is zero when nothing
    /// needed writing.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `SessionBusy`, or the store's error.
    pub async fn save<S: ProjectStore>(&mut self, store: &S) -> Result<SaveReport> {
        let mut total = SaveReport::default();

        loop {
            let ticket = match self.begin_save()? {
                SaveStart::Started(ticket) => ticket,
                SaveStart::Unchanged | SaveStart::Queued => break,
            };

            let result = ticket.execute(store).await;
            match self.finish_save(ticket, result)? {
                SaveOutcome::Saved { report, trailing } => {
                    total.remote_calls += report.remote_calls;
                    total.items_written |= report.items_written;
                    total.title_written |= report.title_written;
                    if total.created.is_none() {
                        total.created = report.created;
                    }
                    if !trailing {
                        break;
                    }
                }
                SaveOutcome::Discarded => break,
            }
        }

        Ok(total)
    }

    // ── Internals ─────────────────────────────────────────────

    fn is_current(&self, generation: u64, project_id: Option<&ProjectId>) -> bool {
        generation == self.generation && project_id == self.project_id.as_ref()
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!(%from, %to, "Session state changed");
        self.emit(&SessionEvent::StateChanged { from, to });
    }

    fn list_changed(&self) {
        self.emit(&SessionEvent::ListChanged {
            len: self.list.len(),
        });
    }

    fn emit(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;
    use crate::storage::{MemoryProjectStore, StoreCall, StoreOp};
    use std::sync::{Arc, Mutex};

    fn owner() -> OwnerId {
        OwnerId::from("user_1")
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn seeded(store: &MemoryProjectStore, title: &str, items: &[&str]) -> ProjectId {
        let project = Project::new(owner(), title.to_string(), strings(items));
        let id = project.id.clone();
        store.insert(project).unwrap();
        id
    }

    async fn opened(store: &MemoryProjectStore, title: &str, items: &[&str]) -> Session {
        let id = seeded(store, title, items);
        let mut session = Session::new(Some(owner()));
        session.open(store, id).await.unwrap();
        store.clear_calls().unwrap();
        session
    }

    #[tokio::test]
    async fn test_open_replaces_list_and_sets_baseline() {
        let store = MemoryProjectStore::new();
        let id = seeded(&store, "Thesis", &["A", "B"]);

        let mut session = Session::new(Some(owner()));
        session.add("local");
        let outcome = session.open(&store, id.clone()).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.project_id(), Some(&id));
        assert_eq!(session.title(), "Thesis");
        assert_eq!(session.list().contents(), strings(&["A", "B"]));
        assert_eq!(session.baseline(), Some(&Snapshot::new("Thesis", strings(&["A", "B"]))));
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_open_missing_project_returns_to_anonymous() {
        let store = MemoryProjectStore::new();
        let mut session = Session::new(Some(owner()));
        session.add("kept");

        let err = session
            .open(&store, ProjectId::from("proj_missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ProjectNotFound { .. }));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.project_id().is_none());
        assert!(session.baseline().is_none());
        assert_eq!(session.list().contents(), strings(&["kept"]));
    }

    #[tokio::test]
    async fn test_open_project_of_other_owner_is_not_found() {
        let store = MemoryProjectStore::new();
        let theirs = Project::new(OwnerId::from("other"), "T".into(), Vec::new());
        let id = theirs.id.clone();
        store.insert(theirs).unwrap();

        let mut session = Session::new(Some(owner()));
        let err = session.open(&store, id).await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_list() {
        let store = MemoryProjectStore::new();
        let id = seeded(&store, "T", &["remote"]);
        store.fail_next(StoreOp::GetItems).unwrap();

        let mut session = Session::new(Some(owner()));
        session.add("local");
        let err = session.open(&store, id).await.unwrap_err();

        assert!(matches!(err, Error::RemoteUnavailable { .. }));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(session.list().contents(), strings(&["local"]));
    }

    #[tokio::test]
    async fn test_load_and_save_require_owner() {
        let store = MemoryProjectStore::new();
        let mut session = Session::new(None);
        session.add("A");

        assert!(matches!(
            session.open(&store, ProjectId::from("proj_1")).await,
            Err(Error::AuthRequired)
        ));
        assert!(matches!(session.save(&store).await, Err(Error::AuthRequired)));
        assert!(store.calls().unwrap().is_empty());
        assert_eq!(session.list().contents(), strings(&["A"]));
    }

    #[tokio::test]
    async fn test_save_without_changes_makes_no_calls() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A", "B"]).await;

        let report = session.save(&store).await.unwrap();

        assert_eq!(report.remote_calls, 0);
        assert!(store.calls().unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_reorder_then_save_writes_items_only() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A", "B", "C"]).await;
        let id = session.project_id().cloned().unwrap();

        session.reorder(0, 2).unwrap();
        assert!(session.is_dirty());
        session.save(&store).await.unwrap();

        assert_eq!(
            store.calls().unwrap(),
            vec![StoreCall::UpdateItems {
                project: id.clone(),
                items: strings(&["B", "C", "A"]),
            }]
        );
        assert!(!session.is_dirty());
        assert_eq!(store.project(&id).unwrap().unwrap().items, strings(&["B", "C", "A"]));
    }

    #[tokio::test]
    async fn test_first_save_creates_project() {
        let store = MemoryProjectStore::new();
        let mut session = Session::new(Some(owner()));
        session.set_title("Draft");
        session.import("[1] A\n\n[2] B");

        let report = session.save(&store).await.unwrap();
        let id = report.created.clone().unwrap();

        assert_eq!(report.remote_calls, 1);
        assert_eq!(session.project_id(), Some(&id));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.baseline(), Some(&Snapshot::new("Draft", strings(&["A", "B"]))));

        let stored = store.project(&id).unwrap().unwrap();
        assert_eq!(stored.title, "Draft");
        assert_eq!(stored.items, strings(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_failed_create_stays_anonymous() {
        let store = MemoryProjectStore::new();
        store.fail_next(StoreOp::Create).unwrap();
        let mut session = Session::new(Some(owner()));
        session.add("A");

        let err = session.save(&store).await.unwrap_err();
        assert!(matches!(err, Error::RemoteUnavailable { .. }));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.project_id().is_none());
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_partial_save_retry_writes_title_only() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "Old", &["A"]).await;
        let id = session.project_id().cloned().unwrap();

        session.add("B");
        session.set_title("New");
        store.fail_next(StoreOp::UpdateTitle).unwrap();
        assert!(session.save(&store).await.is_err());

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.baseline(), Some(&Snapshot::new("Old", strings(&["A", "B"]))));
        assert_eq!(
            session.pending_changes(),
            SyncDiff {
                title_changed: true,
                items_changed: false
            }
        );

        store.clear_calls().unwrap();
        session.save(&store).await.unwrap();
        assert_eq!(
            store.calls().unwrap(),
            vec![StoreCall::UpdateTitle {
                project: id,
                title: "New".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_save_while_loading_is_busy() {
        let store = MemoryProjectStore::new();
        let id = seeded(&store, "T", &[]);
        let mut session = Session::new(Some(owner()));

        let ticket = session.begin_load(id).unwrap();
        assert!(matches!(
            session.begin_save(),
            Err(Error::SessionBusy { .. })
        ));

        let result = ticket.fetch(&store).await;
        session.finish_load(ticket, result).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_save_requested_during_save_is_coalesced() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A"]).await;

        session.add("B");
        let SaveStart::Started(first) = session.begin_save().unwrap() else {
            panic!("expected a save to start");
        };

        // Edits and two more save requests while the first is in flight.
        session.add("C");
        assert!(matches!(session.begin_save().unwrap(), SaveStart::Queued));
        assert!(matches!(session.begin_save().unwrap(), SaveStart::Queued));

        let result = first.execute(&store).await;
        let outcome = session.finish_save(first, result).unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { trailing: true, .. }));
        assert_eq!(session.baseline().unwrap().items, strings(&["A", "B"]));
        assert!(session.is_dirty());

        // One trailing save diffs against the baseline the first save set.
        let SaveStart::Started(trailing) = session.begin_save().unwrap() else {
            panic!("expected the trailing save to start");
        };
        let result = trailing.execute(&store).await;
        let outcome = session.finish_save(trailing, result).unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { trailing: false, .. }));

        let writes = store.write_calls().unwrap();
        assert_eq!(writes.len(), 2);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_stale_load_result_is_discarded() {
        let store = MemoryProjectStore::new();
        let first = seeded(&store, "First", &["1"]);
        let second = seeded(&store, "Second", &["2"]);
        let mut session = Session::new(Some(owner()));

        let stale = session.begin_load(first).unwrap();
        let current = session.begin_load(second.clone()).unwrap();

        let result = current.fetch(&store).await;
        session.finish_load(current, result).unwrap();

        let result = stale.fetch(&store).await;
        assert_eq!(session.finish_load(stale, result).unwrap(), LoadOutcome::Discarded);

        assert_eq!(session.project_id(), Some(&second));
        assert_eq!(session.title(), "Second");
        assert_eq!(session.list().contents(), strings(&["2"]));
    }

    #[tokio::test]
    async fn test_save_result_after_close_is_discarded() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A"]).await;
        session.add("B");

        let SaveStart::Started(ticket) = session.begin_save().unwrap() else {
            panic!("expected a save to start");
        };
        session.close();

        let result = ticket.execute(&store).await;
        assert_eq!(session.finish_save(ticket, result).unwrap(), SaveOutcome::Discarded);
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.baseline().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_closes_project() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A"]).await;

        session.set_owner(None);

        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.project_id().is_none());
        assert!(session.baseline().is_none());
        assert!(session.list().is_empty());
    }

    #[test]
    fn test_add_follows_insert_mode() {
        let mut session = Session::new(None);
        session.add("Smith 2020");
        session.set_insert_mode(InsertMode::Prepend);
        session.add("Jones 2019");
        assert!(session.add("  ").is_none());

        assert_eq!(session.list().contents(), strings(&["Jones 2019", "Smith 2020"]));
        assert_eq!(session.export().unwrap().plain, "[1] Jones 2019\n\n[2] Smith 2020");
    }

    #[test]
    fn test_export_empty_list_is_rejected() {
        let session = Session::new(None);
        assert!(matches!(session.export(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_export_with_links() {
        let mut session = Session::new(None).with_preferences(Preferences {
            insert_mode: InsertMode::Append,
            copy_with_links: true,
        });
        session.add("See www.example.org");

        let export = session.export().unwrap();
        assert_eq!(export.plain, "[1] See www.example.org");
        assert!(export.html.unwrap().contains("<a href=\"http://www.example.org\">"));
    }

    #[test]
    fn test_remove_out_of_range_leaves_list() {
        let mut session = Session::new(None);
        session.import("A\n\nB\n\nC");

        assert!(matches!(
            session.remove_at(5),
            Err(Error::IndexOutOfRange { index: 5, len: 3 })
        ));
        assert_eq!(session.list().len(), 3);
    }

    #[test]
    fn test_observers_see_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut session = Session::new(None);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        session.add("A");
        session.add("B");
        session.reorder(0, 0).unwrap();
        session.reorder(0, 1).unwrap();
        session.set_title("T");

        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                SessionEvent::ListChanged { len: 1 },
                SessionEvent::ListChanged { len: 2 },
                SessionEvent::ListChanged { len: 2 },
                SessionEvent::TitleChanged { title: "T".into() },
            ]
        );
    }

    #[test]
    fn test_unsaved_local_list_is_dirty() {
        let mut session = Session::new(None);
        assert!(!session.is_dirty());
        session.add("A");
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_workspace_round_trip_restores_ready() {
        let store = MemoryProjectStore::new();
        let mut session = opened(&store, "T", &["A", "B"]).await;
        session.reorder(1, 0).unwrap();

        let restored = Session::restore(Some(owner()), session.to_workspace());

        assert_eq!(restored.state(), SessionState::Ready);
        assert_eq!(restored.project_id(), session.project_id());
        assert_eq!(restored.list(), session.list());
        assert_eq!(restored.baseline(), session.baseline());
        assert!(restored.is_dirty());
    }

    #[tokio::test]
    async fn test_workspace_for_other_owner_drops_project() {
        let store = MemoryProjectStore::new();
        let session = opened(&store, "T", &["A"]).await;

        let restored = Session::restore(Some(OwnerId::from("other")), session.to_workspace());

        assert_eq!(restored.state(), SessionState::Anonymous);
        assert!(restored.project_id().is_none());
        assert_eq!(restored.list().contents(), strings(&["A"]));
    }

    #[test]
    fn test_workspace_mid_load_has_no_project() {
        let mut session = Session::new(Some(owner()));
        session.add("local");
        let _ticket = session.begin_load(ProjectId::from("proj_1")).unwrap();

        let workspace = session.to_workspace();
        assert!(workspace.project_id.is_none());
        assert!(workspace.baseline.is_none());
        assert_eq!(workspace.items.contents(), strings(&["local"]));
    }
}
