//! Project model for refsort.
//!
//! A project is a titled, ordered list of reference contents owned by one
//! account. The persisted form carries no item ids; fresh ids are
//! synthesized whenever a project is loaded into a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown for projects whose title is blank.
pub const UNTITLED_PROJECT: &str = "New project";

/// Opaque project identifier issued by the project store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Generate a new project id (`proj_` + 12 hex characters).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("proj_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque owner identity supplied by the authentication collaborator.
///
/// The engine only forwards it to the project store; it never checks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted project record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Account the project belongs to
    pub owner_id: OwnerId,

    /// Display title (may be blank)
    pub title: String,

    /// Reference contents in display order
    pub items: Vec<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Project {
    /// Create a new project with a generated id.
    pub fn new(owner_id: OwnerId, title: String, items: Vec<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Self {
            id: ProjectId::generate(),
            owner_id,
            title,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Title for display, falling back to a placeholder when blank.
    #[must_use]
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }
}

/// Title for display, falling back to [`UNTITLED_PROJECT`] when blank.
#[must_use]
pub fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        UNTITLED_PROJECT
    } else {
        title
    }
}
