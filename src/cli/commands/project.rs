//! Project commands.
//!
//! Commands that talk to the project store:
//! - `refsort open <id>` - Load a project into the local list
//! - `refsort close` - Close the project and clear the list
//! - `refsort save` - Save changes (or create a project)
//! - `refsort status` - Show state and pending changes
//! - `refsort projects` - List saved projects

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use super::{RunContext, block_on, print_json};
use crate::error::{Error, Result};
use crate::model::{ProjectId, display_title};
use crate::sync::{items_hash, short_hash};

#[derive(Serialize)]
struct ProjectOutput {
    id: String,
    title: String,
    item_count: usize,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize)]
struct ProjectListOutput {
    projects: Vec<ProjectOutput>,
    count: usize,
}

#[derive(Serialize)]
struct SaveOutput<'a> {
    project_id: Option<&'a str>,
    created: bool,
    items_written: bool,
    title_written: bool,
    remote_calls: usize,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    owner: Option<&'a str>,
    project_id: Option<&'a str>,
    title: &'a str,
    state: &'a str,
    item_count: usize,
    dirty: bool,
    title_changed: bool,
    items_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline_hash: Option<String>,
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map_or_else(|| ts.to_string(), |dt| dt.to_rfc3339())
}

/// Execute `open`.
///
/// # Errors
///
/// Returns `AuthRequired`, `ProjectNotFound` or `RemoteUnavailable`. The
/// workspace is written either way, so a failed open leaves no project.
pub fn execute_open(ctx: &RunContext, id: &str) -> Result<()> {
    let mut session = ctx.load_session()?;
    let store = ctx.open_store()?;

    let result = block_on(session.open(&store, ProjectId::from(id.trim())))?;
    ctx.store_session(&session)?;
    result?;

    info!(project = id, "Opened project");
    if ctx.json {
        return print_json(&serde_json::json!({
            "project_id": id,
            "title": session.title(),
            "item_count": session.list().len(),
        }));
    }
    println!(
        "{} {} ({} references)",
        "Opened".green(),
        session.display_title().bold(),
        session.list().len()
    );
    Ok(())
}

/// Execute `close`.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read or written.
pub fn execute_close(ctx: &RunContext) -> Result<()> {
    let mut session = ctx.load_session()?;
    let had_unsaved = session.project_id().is_some() && session.is_dirty();
    session.close();
    ctx.store_session(&session)?;

    if ctx.json {
        return print_json(&serde_json::json!({ "closed": true, "discarded_changes": had_unsaved }));
    }
    println!("{}", "Closed project.".green());
    if had_unsaved {
        println!("{}", "Unsaved changes were discarded.".yellow());
    }
    Ok(())
}

/// Execute `save`.
///
/// # Errors
///
/// Returns `AuthRequired` without touching the store, or the store's error.
/// Writes that landed before a failure are kept in the workspace baseline.
pub fn execute_save(ctx: &RunContext) -> Result<()> {
    let mut session = ctx.load_session()?;
    if session.owner().is_none() {
        return Err(Error::AuthRequired);
    }
    let store = ctx.open_store()?;

    let result = block_on(session.save(&store))?;
    ctx.store_session(&session)?;
    let report = result?;

    if ctx.json {
        return print_json(&SaveOutput {
            project_id: session.project_id().map(ProjectId::as_str),
            created: report.created.is_some(),
            items_written: report.items_written,
            title_written: report.title_written,
            remote_calls: report.remote_calls,
        });
    }

    match (&report.created, report.remote_calls) {
        (Some(id), _) => println!("{} project {}", "Created".green(), id.to_string().bold()),
        (None, 0) => println!("{}", "Nothing to save.".dimmed()),
        (None, _) => {
            let mut parts = Vec::new();
            if report.items_written {
                parts.push("references");
            }
            if report.title_written {
                parts.push("title");
            }
            println!("{} {}", "Saved".green(), parts.join(" and "));
        }
    }
    Ok(())
}

/// Execute `status`.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read.
pub fn execute_status(ctx: &RunContext) -> Result<()> {
    let session = ctx.load_session()?;
    let changes = session.pending_changes();
    let dirty = session.is_dirty();
    let baseline_hash = session
        .baseline()
        .map(|b| short_hash(&items_hash(&b.items)).to_string());

    if ctx.json {
        return print_json(&StatusOutput {
            owner: session.owner().map(|o| o.as_str()),
            project_id: session.project_id().map(ProjectId::as_str),
            title: session.title(),
            state: session.state().as_str(),
            item_count: session.list().len(),
            dirty,
            title_changed: dirty && changes.title_changed,
            items_changed: dirty && changes.items_changed,
            baseline_hash,
        });
    }

    println!("refsort status");
    println!("==============");
    println!();
    match session.owner() {
        Some(owner) => println!("Owner:   {owner}"),
        None => println!("Owner:   {}", "not signed in".dimmed()),
    }
    match session.project_id() {
        Some(id) => println!("Project: {} ({id})", session.display_title().bold()),
        None => println!("Project: {}", "none (unsaved list)".dimmed()),
    }
    println!("State:   {}", session.state());
    println!("Items:   {}", session.list().len());
    if let Some(hash) = &baseline_hash {
        println!("Saved:   {hash}");
    }
    println!();

    if !dirty {
        println!("{}", "No unsaved changes.".green());
    } else if session.project_id().is_none() {
        println!("{}", "Unsaved list. Run `refsort save` to create a project.".yellow());
    } else {
        if changes.items_changed {
            println!("{}", "References changed since last save.".yellow());
        }
        if changes.title_changed {
            println!("{}", "Title changed since last save.".yellow());
        }
    }
    Ok(())
}

/// Execute `projects`.
///
/// # Errors
///
/// Returns `AuthRequired` without an owner, or the store's error.
pub fn execute_projects(ctx: &RunContext, limit: usize) -> Result<()> {
    let owner = ctx.owner.as_ref().ok_or(Error::AuthRequired)?;
    let store = ctx.open_store()?;
    let projects = store
        .list_projects(owner, limit)
        .map_err(Error::into_remote)?;

    if ctx.json {
        let projects: Vec<ProjectOutput> = projects
            .into_iter()
            .map(|p| ProjectOutput {
                item_count: p.items.len(),
                title: p.title,
                id: p.id.to_string(),
                created_at: format_timestamp(p.created_at),
                updated_at: format_timestamp(p.updated_at),
            })
            .collect();
        let count = projects.len();
        return print_json(&ProjectListOutput { projects, count });
    }

    if projects.is_empty() {
        println!("No projects found.");
        println!("Save the current list with: refsort save");
        return Ok(());
    }

    println!("Projects ({} found):", projects.len());
    println!();
    for project in &projects {
        println!(
            "  {} {} {}",
            project.id.to_string().cyan(),
            display_title(&project.title).bold(),
            format!("({} references)", project.items.len()).dimmed()
        );
    }
    Ok(())
}
