//! Change detection and synchronization with the project store.
//!
//! This module decides which remote writes a save needs and performs them:
//!
//! - **Reconcile**: positional diff of the current `{title, items}` against
//!   the baseline snapshot, producing a [`SavePlan`]
//! - **Execute**: issue the planned store calls (items before title) and
//!   report exactly which parts were committed
//! - **Hashing**: SHA256 fingerprints of item lists for audit trails and
//!   status output
//!
//! # Example
//!
//! ```ignore
//! use refsort::sync::{plan_save, execute_plan};
//!
//! let plan = plan_save(Some(&project_id), current, Some(&baseline));
//! match execute_plan(&store, &owner, &plan).await {
//!     Ok(report) => baseline = report.advance(Some(&baseline), &plan),
//!     Err(failure) => { /* failure.committed says what already landed */ }
//! }
//! ```

mod hash;
mod reconcile;

pub use hash::{content_hash, items_hash, short_hash};
pub use reconcile::{
    SaveFailure, SavePlan, SaveReport, SyncDiff, diff, execute_plan, items_equal, plan_save,
};
