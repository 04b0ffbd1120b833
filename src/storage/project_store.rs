//! Project store trait.
//!
//! Defines the interface every project backend implements. Methods are
//! async because a store may live across a network boundary; all calls are
//! keyed by project id, and ownership is only ever checked by the store.

use std::future::Future;

use crate::error::Result;
use crate::model::{OwnerId, ProjectId};

/// Trait for remote project stores.
///
/// Infrastructure failures are reported as `Error::RemoteUnavailable`;
/// lookups of unknown projects as `Error::ProjectNotFound`.
pub trait ProjectStore: Send + Sync {
    /// Create a project and return its newly issued id.
    fn create(
        &self,
        title: &str,
        items: &[String],
        owner: &OwnerId,
    ) -> impl Future<Output = Result<ProjectId>> + Send;

    /// Whether `project` exists and belongs to `owner`.
    fn exists(
        &self,
        project: &ProjectId,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Current title of `project`.
    fn get_title(&self, project: &ProjectId) -> impl Future<Output = Result<String>> + Send;

    /// Current item contents of `project`, in display order.
    fn get_items(&self, project: &ProjectId) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Overwrite the title of `project`.
    fn update_title(
        &self,
        project: &ProjectId,
        title: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite the full item list of `project`.
    fn update_items(
        &self,
        project: &ProjectId,
        items: &[String],
    ) -> impl Future<Output = Result<()>> + Send;
}
