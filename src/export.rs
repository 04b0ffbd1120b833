//! Export sinks: where a rendered list goes when it is copied out.
//!
//! The engine hands over plain text plus the optional HTML rendering; a sink
//! decides what to do with each. The CLI uses [`WriterSink`] for stdout and
//! [`FileSink`] for `--output`.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::atomic_write;
use crate::error::Result;
use crate::list::Export;

/// Destination for an exported list.
pub trait ExportSink {
    /// Deliver one export.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    fn deliver(&mut self, export: &Export) -> Result<()>;
}

/// Writes one representation to any `io::Write`.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    prefer_html: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            prefer_html: false,
        }
    }

    /// Write the HTML rendering instead of plain text when there is one.
    #[must_use]
    pub fn prefer_html(mut self, prefer: bool) -> Self {
        self.prefer_html = prefer;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for WriterSink<W> {
    fn deliver(&mut self, export: &Export) -> Result<()> {
        let body = match (&export.html, self.prefer_html) {
            (Some(html), true) => html.as_str(),
            _ => export.plain.as_str(),
        };
        writeln!(self.writer, "{body}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes plain text to a file, and HTML to a sibling `.html` file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the HTML rendering is written.
    ///
    /// A sibling `.html` file, or `<stem>.links.html` when the target itself
    /// already ends in `.html`/`.htm`.
    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        let is_html = self
            .path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
            });

        if is_html {
            self.path.with_extension("links.html")
        } else {
            self.path.with_extension("html")
        }
    }
}

impl ExportSink for FileSink {
    fn deliver(&mut self, export: &Export) -> Result<()> {
        atomic_write(&self.path, &export.plain)?;

        if let Some(html) = &export.html {
            atomic_write(&self.html_path(), html)?;
        }

        debug!(path = %self.path.display(), html = export.html.is_some(), "Exported list");
        Ok(())
    }
}
