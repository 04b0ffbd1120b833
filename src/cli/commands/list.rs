//! List editing commands.
//!
//! - `refsort add <text>` - Add one reference
//! - `refsort import [file]` - Import blank-line separated references
//! - `refsort list` - Show the numbered list
//! - `refsort remove <pos>` - Remove a reference
//! - `refsort move <from> <to>` - Move a reference
//! - `refsort clear` - Remove every reference
//! - `refsort title [title]` - Show or set the title

use std::io::Read;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{RunContext, print_json, to_index};
use crate::error::Result;
use crate::list::InsertMode;
use crate::model::ReferenceItem;
use crate::session::Session;

#[derive(Serialize)]
struct ItemOutput<'a> {
    position: usize,
    id: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    title: &'a str,
    project_id: Option<&'a str>,
    dirty: bool,
    items: Vec<ItemOutput<'a>>,
    count: usize,
}

#[derive(Serialize)]
struct ChangeOutput<'a> {
    action: &'a str,
    count: usize,
    len: usize,
}

fn items_output(session: &Session) -> Vec<ItemOutput<'_>> {
    session
        .list()
        .iter()
        .enumerate()
        .map(|(index, item)| ItemOutput {
            position: index + 1,
            id: item.id().as_str(),
            content: item.content(),
        })
        .collect()
}

fn report_change(ctx: &RunContext, action: &str, count: usize, len: usize) -> Result<()> {
    if ctx.json {
        return print_json(&ChangeOutput { action, count, len });
    }
    println!("{} {count} ({len} in list)", action.green());
    Ok(())
}

/// Apply an insert-mode override for one command.
fn with_mode<T>(session: &mut Session, mode: Option<InsertMode>, f: impl FnOnce(&mut Session) -> T) -> T {
    let saved = session.preferences();
    if let Some(mode) = mode {
        session.set_insert_mode(mode);
    }
    let result = f(session);
    session.set_preferences(saved);
    result
}

/// Execute `add`.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read or written.
pub fn execute_add(ctx: &RunContext, content: &str, mode: Option<InsertMode>) -> Result<()> {
    let mut session = ctx.load_session()?;
    let added = with_mode(&mut session, mode, |s| s.add(content));
    ctx.store_session(&session)?;

    report_change(ctx, "Added", usize::from(added.is_some()), session.list().len())
}

/// Execute `import`, reading `file` or stdin.
///
/// # Errors
///
/// Returns an error if the input or the workspace cannot be read, or the
/// workspace cannot be written.
pub fn execute_import(ctx: &RunContext, file: Option<&Path>, mode: Option<InsertMode>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut session = ctx.load_session()?;
    let count = with_mode(&mut session, mode, |s| s.import(&raw));
    ctx.store_session(&session)?;

    report_change(ctx, "Imported", count, session.list().len())
}

/// Execute `list`.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read.
pub fn execute_list(ctx: &RunContext) -> Result<()> {
    let session = ctx.load_session()?;

    if ctx.json {
        return print_json(&ListOutput {
            title: session.title(),
            project_id: session.project_id().map(|p| p.as_str()),
            dirty: session.is_dirty(),
            count: session.list().len(),
            items: items_output(&session),
        });
    }

    let marker = if session.is_dirty() { " *" } else { "" };
    println!("{}{}", session.display_title().bold(), marker.yellow());

    if session.list().is_empty() {
        println!("{}", "No references yet.".dimmed());
        println!("Add one with: refsort add \"Smith, J. (2020). Title.\"");
        return Ok(());
    }

    for (index, item) in session.list().iter().enumerate() {
        println!("{} {}", format!("[{}]", index + 1).cyan(), item.content());
    }
    Ok(())
}

/// Execute `remove`.
///
/// # Errors
///
/// Returns `IndexOutOfRange` for a position past the end of the list.
pub fn execute_remove(ctx: &RunContext, position: u32) -> Result<()> {
    let mut session = ctx.load_session()?;
    let removed: ReferenceItem = session.remove_at(to_index(position)?)?;
    ctx.store_session(&session)?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "removed": removed,
            "len": session.list().len(),
        }));
    }
    println!("{} [{position}] {}", "Removed".green(), removed.content());
    Ok(())
}

/// Execute `move`.
///
/// # Errors
///
/// Returns `IndexOutOfRange` if either position is past the end of the list.
pub fn execute_move(ctx: &RunContext, from: u32, to: u32) -> Result<()> {
    let mut session = ctx.load_session()?;
    session.reorder(to_index(from)?, to_index(to)?)?;
    ctx.store_session(&session)?;

    if ctx.json {
        return print_json(&serde_json::json!({ "from": from, "to": to }));
    }
    println!("{} {from} → {to}", "Moved".green());
    Ok(())
}

/// Execute `clear`.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read or written.
pub fn execute_clear(ctx: &RunContext) -> Result<()> {
    let mut session = ctx.load_session()?;
    let count = session.list().len();
    session.clear();
    ctx.store_session(&session)?;

    report_change(ctx, "Cleared", count, 0)
}

/// Execute `title`, showing or setting the title.
///
/// # Errors
///
/// Returns an error if the workspace cannot be read or written.
pub fn execute_title(ctx: &RunContext, title: Option<&str>) -> Result<()> {
    let mut session = ctx.load_session()?;

    if let Some(title) = title {
        session.set_title(title.trim());
        ctx.store_session(&session)?;
    }

    if ctx.json {
        return print_json(&serde_json::json!({
            "title": session.title(),
            "display_title": session.display_title(),
        }));
    }
    println!("{}", session.display_title());
    Ok(())
}
