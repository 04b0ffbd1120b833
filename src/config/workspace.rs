//! Workspace file: the local session kept between CLI invocations.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::session::Workspace;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Load the workspace at `path`; an absent file is an empty workspace.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_workspace(path: &Path) -> Result<Workspace> {
    if !path.exists() {
        debug!(path = %path.display(), "No workspace file, starting empty");
        return Ok(Workspace::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist the workspace at `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_workspace(path: &Path, workspace: &Workspace) -> Result<()> {
    let content = serde_json::to_string_pretty(workspace)?;
    atomic_write(path, &content)?;
    debug!(path = %path.display(), items = workspace.items.len(), "Saved workspace");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::OrderedList;
    use crate::model::{OwnerId, ProjectId, Snapshot};

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("workspace.json.tmp").exists());
    }

    #[test]
    fn test_missing_workspace_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = load_workspace(&dir.path().join("nope.json")).unwrap();
        assert_eq!(workspace, Workspace::default());
    }

    #[test]
    fn test_workspace_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("workspace.json");

        let workspace = Workspace {
            owner: Some(OwnerId::from("user_1")),
            project_id: Some(ProjectId::from("proj_abc")),
            title: "Thesis".into(),
            items: OrderedList::from_contents(["A", "B"]),
            baseline: Some(Snapshot::new("Thesis", vec!["A".into()])),
        };

        save_workspace(&path, &workspace).unwrap();
        assert_eq!(load_workspace(&path).unwrap(), workspace);
    }

    #[test]
    fn test_corrupt_workspace_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        fs::write(&path, "[").unwrap();

        assert!(load_workspace(&path).is_err());
    }
}
