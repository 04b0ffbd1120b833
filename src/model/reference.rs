//! Reference item model.
//!
//! A reference is one free-text entry of the list (usually a citation).
//! Its identity is assigned once at creation and is independent of the
//! position the item currently occupies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of a [`ReferenceItem`].
///
/// Never derived from the display position and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generate a fresh identifier (`ref_<uuid>`).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("ref_{}", uuid::Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of an ordered reference list.
///
/// Content and id are immutable once created; reordering only changes
/// the position of the item inside its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    id: ItemId,
    content: String,
}

impl ReferenceItem {
    /// Create an item with a freshly generated id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume the item, keeping only its content (the persisted form).
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }
}
