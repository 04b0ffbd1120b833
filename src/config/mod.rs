//! Configuration management.
//!
//! Resolves where refsort keeps its files and who the current owner is.
//!
//! # Layout
//!
//! Everything lives under `~/.refsort/` unless overridden:
//! - **Database**: `~/.refsort/data/projects.db` (the project store)
//! - **Workspace**: `~/.refsort/workspace.json` (the local session between runs)
//! - **Settings**: `~/.refsort/config.json` (preference toggles)

mod settings;
mod workspace;

pub use settings::{Settings, load_settings, save_settings};
pub use workspace::{atomic_write, load_workspace, save_workspace};

use crate::model::OwnerId;

use std::path::{Path, PathBuf};

/// Get the global refsort directory (`~/.refsort/`).
#[must_use]
pub fn global_refsort_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".refsort"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `REFSORT_TEST_DB=1` (or any non-empty
/// value other than `0`/`false`). It redirects the database to an isolated
/// location.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("REFSORT_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path (`~/.refsort/test/projects.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_refsort_dir().map(|dir| dir.join("test").join("projects.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `REFSORT_TEST_DB` environment variable → uses test database
/// 3. `REFSORT_DB` environment variable
/// 4. Global location: `~/.refsort/data/projects.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    if let Some(path) = non_empty_env("REFSORT_DB") {
        return Some(PathBuf::from(path));
    }

    global_refsort_dir().map(|dir| dir.join("data").join("projects.db"))
}

/// Resolve the workspace file path.
///
/// Priority: explicit path > `REFSORT_WORKSPACE` > `~/.refsort/workspace.json`.
#[must_use]
pub fn resolve_workspace_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(path) = non_empty_env("REFSORT_WORKSPACE") {
        return Some(PathBuf::from(path));
    }

    global_refsort_dir().map(|dir| dir.join("workspace.json"))
}

/// Resolve the settings file path.
///
/// Priority: `REFSORT_CONFIG` > `~/.refsort/config.json`.
#[must_use]
pub fn resolve_settings_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_env("REFSORT_CONFIG") {
        return Some(PathBuf::from(path));
    }

    global_refsort_dir().map(|dir| dir.join("config.json"))
}

/// Resolve the signed-in owner.
///
/// Priority: explicit `--owner` > `REFSORT_OWNER`. Blank values count as
/// absent; `None` means anonymous.
#[must_use]
pub fn resolve_owner(explicit: Option<&str>) -> Option<OwnerId> {
    explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(OwnerId::from)
        .or_else(|| non_empty_env("REFSORT_OWNER").map(|s| OwnerId::from(s.trim())))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
