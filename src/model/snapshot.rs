//! Snapshot model: the persisted shape of a project's editable state.
//!
//! The baseline snapshot is the last `{title, items}` pair known to match
//! the project store. Items are plain text; ids are never persisted.

use serde::{Deserialize, Serialize};

use super::reference::ReferenceItem;

/// A `{title, items}` pair in persisted (id-free) form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    pub items: Vec<String>,
}

impl Snapshot {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }

    /// Capture the current state of a list, dropping item ids.
    pub fn capture(title: &str, items: &[ReferenceItem]) -> Self {
        Self {
            title: title.to_string(),
            items: items.iter().map(|i| i.content().to_string()).collect(),
        }
    }
}
