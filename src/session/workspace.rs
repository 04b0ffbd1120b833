//! Serializable record of a session, for restoring it in a later process.
//!
//! Only settled state is recorded. A session caught mid-load is written as
//! if no project were open; a session caught mid-save is written with the
//! baseline from before the save, so the next save repeats the writes.

use serde::{Deserialize, Serialize};

use crate::list::OrderedList;
use crate::model::{OwnerId, ProjectId, Snapshot};

/// On-disk form of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Owner the project was opened under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    #[serde(default)]
    pub title: String,

    /// Items with their ids, in display order
    #[serde(default)]
    pub items: OrderedList,

    /// Last state known to match the project store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Snapshot>,
}
