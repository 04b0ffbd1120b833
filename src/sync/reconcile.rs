//! Change detection against the baseline snapshot and save execution.
//!
//! # Save policy
//!
//! - No project yet: a single `create` carrying the current title and items.
//! - Items are written only when they differ positionally from the baseline.
//! - The title is written only when it differs from the baseline.
//! - When both differ, items go first. A failed title write after a
//!   successful items write still reports the items as committed.
//! - Nothing changed: no store call at all.

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::model::{OwnerId, ProjectId, Snapshot};
use crate::storage::ProjectStore;

/// Which fields of a project differ from the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncDiff {
    pub title_changed: bool,
    pub items_changed: bool,
}

impl SyncDiff {
    /// A diff that marks every field as changed.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            title_changed: true,
            items_changed: true,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.title_changed && !self.items_changed
    }
}

/// Positional equality of two item lists.
#[must_use]
pub fn items_equal(current: &[String], baseline: &[String]) -> bool {
    current.len() == baseline.len() && current.iter().zip(baseline).all(|(a, b)| a == b)
}

/// Compare the current state against the baseline.
#[must_use]
pub fn diff(current: &Snapshot, baseline: &Snapshot) -> SyncDiff {
    SyncDiff {
        title_changed: current.title != baseline.title,
        items_changed: !items_equal(&current.items, &baseline.items),
    }
}

/// The store calls a save needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    /// No active project: create one from the snapshot.
    Create { snapshot: Snapshot },

    /// Write the changed fields of an existing project.
    Update {
        project_id: ProjectId,
        snapshot: Snapshot,
        diff: SyncDiff,
    },

    /// Nothing to write.
    Unchanged,
}

impl SavePlan {
    /// Number of store calls the plan issues when everything succeeds.
    #[must_use]
    pub fn remote_calls(&self) -> usize {
        match self {
            Self::Create { .. } => 1,
            Self::Update { diff, .. } => {
                usize::from(diff.items_changed) + usize::from(diff.title_changed)
            }
            Self::Unchanged => 0,
        }
    }

    /// The state the plan would persist.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Create { snapshot } | Self::Update { snapshot, .. } => Some(snapshot),
            Self::Unchanged => None,
        }
    }
}

/// Decide what a save of `current` must write.
///
/// An open project without a baseline is written in full.
#[must_use]
pub fn plan_save(
    project: Option<&ProjectId>,
    current: Snapshot,
    baseline: Option<&Snapshot>,
) -> SavePlan {
    let Some(project_id) = project else {
        return SavePlan::Create { snapshot: current };
    };

    let diff = baseline.map_or_else(SyncDiff::full, |b| diff(&current, b));
    if diff.is_empty() {
        debug!(project = %project_id, "No changes to save");
        return SavePlan::Unchanged;
    }

    SavePlan::Update {
        project_id: project_id.clone(),
        snapshot: current,
        diff,
    }
}

/// What a save actually committed to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Id issued by a `create`
    pub created: Option<ProjectId>,
    pub items_written: bool,
    pub title_written: bool,
    /// Store calls issued, including a failed one
    pub remote_calls: usize,
}

impl SaveReport {
    /// Baseline after this save, given the baseline the plan was made from.
    ///
    /// Only committed fields move forward. Without a prior baseline a
    /// partially written update leaves no baseline, so the next save writes
    /// everything again.
    #[must_use]
    pub fn advance(&self, baseline: Option<&Snapshot>, plan: &SavePlan) -> Option<Snapshot> {
        match plan {
            SavePlan::Create { snapshot } => {
                if self.created.is_some() {
                    Some(snapshot.clone())
                } else {
                    baseline.cloned()
                }
            }
            SavePlan::Update { snapshot, diff, .. } => match baseline {
                Some(base) => Some(Snapshot {
                    title: if self.title_written {
                        snapshot.title.clone()
                    } else {
                        base.title.clone()
                    },
                    items: if self.items_written {
                        snapshot.items.clone()
                    } else {
                        base.items.clone()
                    },
                }),
                None => {
                    let complete = (self.items_written || !diff.items_changed)
                        && (self.title_written || !diff.title_changed);
                    complete.then(|| snapshot.clone())
                }
            },
            SavePlan::Unchanged => baseline.cloned(),
        }
    }
}

/// A save that stopped part way.
#[derive(Debug)]
pub struct SaveFailure {
    /// Writes that landed before the failure
    pub committed: SaveReport,
    pub error: Error,
}

impl From<SaveFailure> for Error {
    fn from(failure: SaveFailure) -> Self {
        failure.error
    }
}

/// Issue the store calls of `plan`, items before title.
///
/// # Errors
///
/// Returns a [`SaveFailure`] carrying the store error and the writes that
/// were committed before it.
pub async fn execute_plan<S: ProjectStore>(
    store: &S,
    owner: &OwnerId,
    plan: &SavePlan,
) -> std::result::Result<SaveReport, SaveFailure> {
    let mut report = SaveReport::default();

    match plan {
        SavePlan::Unchanged => {}

        SavePlan::Create { snapshot } => {
            report.remote_calls += 1;
            let id = store
                .create(&snapshot.title, &snapshot.items, owner)
                .await
                .map_err(|error| fail(&report, error))?;

            info!(project = %id, items = snapshot.items.len(), "Created project");
            report.created = Some(id);
            report.items_written = true;
            report.title_written = true;
        }

        SavePlan::Update {
            project_id,
            snapshot,
            diff,
        } => {
            if diff.items_changed {
                report.remote_calls += 1;
                store
                    .update_items(project_id, &snapshot.items)
                    .await
                    .map_err(|error| fail(&report, error))?;
                report.items_written = true;
            }

            if diff.title_changed {
                report.remote_calls += 1;
                store
                    .update_title(project_id, &snapshot.title)
                    .await
                    .map_err(|error| fail(&report, error))?;
                report.title_written = true;
            }

            info!(
                project = %project_id,
                items = report.items_written,
                title = report.title_written,
                "Saved project"
            );
        }
    }

    Ok(report)
}

fn fail(committed: &SaveReport, error: Error) -> SaveFailure {
    warn!(
        error = %error,
        items_written = committed.items_written,
        "Save failed"
    );
    SaveFailure {
        committed: committed.clone(),
        error,
    }
}
