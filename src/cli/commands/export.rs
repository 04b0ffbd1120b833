//! Export command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::{RunContext, print_json};
use crate::error::Result;
use crate::export::{ExportSink, FileSink, WriterSink};

#[derive(Serialize)]
struct ExportOutput<'a> {
    plain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    count: usize,
}

/// Execute `export`.
///
/// `links` overrides the copy-with-links setting for this run.
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty list, or an error if the output
/// cannot be written.
pub fn execute(
    ctx: &RunContext,
    output: Option<&Path>,
    links: Option<bool>,
    html: bool,
) -> Result<()> {
    let mut session = ctx.load_session()?;
    if let Some(links) = links {
        session.set_copy_with_links(links);
    }
    // Printing HTML implies rendering it.
    if html {
        session.set_copy_with_links(true);
    }

    let export = session.export()?;
    let count = session.list().len();

    if let Some(path) = output {
        let mut sink = FileSink::new(path);
        sink.deliver(&export)?;

        if ctx.json {
            return print_json(&ExportOutput {
                plain: &export.plain,
                html: export.html.as_deref(),
                path: Some(path.display().to_string()),
                count,
            });
        }
        println!("{} {count} references to {}", "Exported".green(), path.display());
        if export.html.is_some() {
            println!("  HTML: {}", sink.html_path().display());
        }
        return Ok(());
    }

    if ctx.json {
        return print_json(&ExportOutput {
            plain: &export.plain,
            html: export.html.as_deref(),
            path: None,
            count,
        });
    }

    WriterSink::new(std::io::stdout().lock())
        .prefer_html(html)
        .deliver(&export)
}
