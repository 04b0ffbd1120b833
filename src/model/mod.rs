//! Data models for refsort.
//!
//! This module contains the domain models:
//! - ReferenceItem (one entry with a stable identity)
//! - Project (persisted title + ordered contents)
//! - Snapshot (the `{title, items}` pair used for change detection)

pub mod project;
pub mod reference;
pub mod snapshot;

pub use project::{OwnerId, Project, ProjectId, display_title};
pub use reference::{ItemId, ReferenceItem};
pub use snapshot::Snapshot;
