//! The ordered reference list engine.
//!
//! - [`import`] - Split pasted text into new reference items
//! - [`store`] - The in-memory ordered list with stable item identity
//! - [`format`] - Numbered plain-text / HTML rendering for export
//!
//! # Data Flow
//!
//! ```text
//! raw paste ──► import::parse ──► OrderedList::import_many ──► format::render
//!                                    ▲
//!                 add / remove_at / reorder / replace_all
//! ```

pub mod format;
pub mod import;
pub mod store;

pub use format::{Export, render, render_plain};
pub use import::parse;
pub use store::OrderedList;

use serde::{Deserialize, Serialize};

/// Where new or imported entries are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    /// Insert at the end of the list
    #[default]
    Append,
    /// Insert at the front of the list
    Prepend,
}

impl InsertMode {
    /// Map the "add to start" toggle onto a mode.
    #[must_use]
    pub const fn from_prepend(prepend: bool) -> Self {
        if prepend { Self::Prepend } else { Self::Append }
    }

    #[must_use]
    pub const fn is_prepend(self) -> bool {
        matches!(self, Self::Prepend)
    }
}
