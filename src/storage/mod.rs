//! Project store layer for refsort.
//!
//! The engine talks to persisted projects only through the [`ProjectStore`]
//! trait, a key-value style service keyed by project id. Two backends are
//! provided:
//!
//! - [`sqlite`] - Durable store on a local SQLite database (WAL mode,
//!   immediate transactions, audit events)
//! - [`memory`] - In-process store that records every call, used to verify
//!   minimal-diff saves and to inject failures
//!
//! # Submodules
//!
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions

pub mod events;
pub mod memory;
pub mod project_store;
pub mod schema;
pub mod sqlite;

pub use memory::{MemoryProjectStore, StoreCall, StoreOp};
pub use project_store::ProjectStore;
pub use sqlite::SqliteProjectStore;
