//! Session lifecycle states and change notifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ProjectId;
use crate::sync::SaveReport;

/// Where a session is in its project lifecycle.
///
/// ```text
/// Anonymous ──open──► Loading ──ok──► Ready ──save──► Saving ──► Ready
///     ▲                  │              │
///     └──── failure ─────┘◄─── close ───┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No active project
    #[default]
    Anonymous,
    /// A project load is in flight
    Loading,
    /// A project is open and idle
    Ready,
    /// A save is in flight
    Saving,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
        }
    }

    /// Whether a remote call is outstanding.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Loading | Self::Saving)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification delivered to session observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Items were added, removed, reordered or replaced
    ListChanged { len: usize },
    TitleChanged { title: String },
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    /// The active project changed (`None` when closed)
    ProjectChanged(Option<ProjectId>),
    /// A save finished and the baseline moved
    Saved(SaveReport),
}
