//! Import parser for pasted reference lists.
//!
//! Splits raw text into blocks on blank-line boundaries and turns each
//! non-empty block into a new [`ReferenceItem`]. A leading numeric citation
//! marker such as `[12] ` is stripped so that re-importing an exported list
//! does not double the numbering.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::InsertMode;
use crate::model::ReferenceItem;

/// Two or more consecutive newlines, LF or CRLF.
static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:\r?\n)+").expect("valid blank line regex"));

/// `[<digits>]` followed by one whitespace character, anchored at the start.
static CITATION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\d+\]\s").expect("valid citation marker regex"));

/// Parse raw pasted text into new reference items, in input order.
///
/// `mode` does not affect the returned order; merging at the front or back
/// of a list is left to [`OrderedList::import_many`](super::OrderedList::import_many).
/// Text without any non-blank block yields an empty vector.
#[must_use]
pub fn parse(raw: &str, mode: InsertMode) -> Vec<ReferenceItem> {
    let items: Vec<ReferenceItem> = split_blocks(raw)
        .map(ReferenceItem::new)
        .collect();

    debug!(count = items.len(), ?mode, "Parsed import text");
    items
}

/// Split `raw` into cleaned block contents, dropping empty blocks.
fn split_blocks(raw: &str) -> impl Iterator<Item = String> + '_ {
    BLANK_LINE_RE
        .split(raw)
        .map(str::trim_start)
        .filter(|block| !block.trim().is_empty())
        .map(|block| strip_marker(block).trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Remove a leading `[n] ` marker, if present.
fn strip_marker(block: &str) -> &str {
    match CITATION_MARKER_RE.find(block) {
        Some(m) => &block[m.end()..],
        None => block,
    }
}
