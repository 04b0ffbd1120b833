//! Export formatting.
//!
//! Renders a list as `"[n] content"` blocks separated by a blank line. The
//! numbering is the 1-based position at render time. With links enabled, an
//! additional HTML rendering wraps URL-like substrings in anchors; the plain
//! text stays identical either way, so it always re-imports cleanly.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::ReferenceItem;

/// Separator placed between rendered entries.
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// URL-like substrings: explicit http(s) schemes or a bare `www.` host.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"']+"#).expect("valid url regex")
});

/// The rendered export of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    /// Numbered plain text
    pub plain: String,

    /// Rich-text rendering with hyperlinks, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Export {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty()
    }
}

/// Render items for export.
#[must_use]
pub fn render(items: &[ReferenceItem], with_links: bool) -> Export {
    let plain = render_plain(items);
    let html = with_links.then(|| render_html(items));
    Export { plain, html }
}

/// Render the numbered plain-text form.
#[must_use]
pub fn render_plain(items: &[ReferenceItem]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(ENTRY_SEPARATOR);
        }
        let _ = write!(out, "[{}] {}", index + 1, item.content());
    }
    out
}

/// Render the numbered HTML form with anchors around URLs.
fn render_html(items: &[ReferenceItem]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str("<br /><br />");
        }
        let _ = write!(out, "[{}] {}", index + 1, linkify(item.content()));
    }
    out
}

/// Escape text and wrap every URL-like substring in an anchor.
fn linkify(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for m in URL_RE.find_iter(content) {
        let url = trim_trailing_punctuation(m.as_str());
        if is_bare_prefix(url) {
            continue;
        }
        let end = m.start() + url.len();

        out.push_str(&escape_html(&content[last..m.start()]));

        let href = if url.to_ascii_lowercase().starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        let _ = write!(
            out,
            "<a href=\"{}\">{}</a>",
            escape_html(&href),
            escape_html(url)
        );
        last = end;
    }

    out.push_str(&escape_html(&content[last..]));
    out
}

/// Sentence punctuation directly after a URL is not part of it.
///
/// A closing `)` or `]` is kept when the URL holds a matching opener,
/// so `.../Foo_(bar)` stays whole.
fn trim_trailing_punctuation(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ';', ':', '!', '?']);
        let next = match trimmed.chars().last() {
            Some(close @ (')' | ']')) => {
                let open = if close == ')' { '(' } else { '[' };
                let opens = trimmed.matches(open).count();
                let closes = trimmed.matches(close).count();
                if closes > opens {
                    &trimmed[..trimmed.len() - 1]
                } else {
                    trimmed
                }
            }
            _ => trimmed,
        };
        if next.len() == url.len() {
            return url;
        }
        url = next;
    }
}

/// A match with nothing after its scheme or `www` is not a link.
fn is_bare_prefix(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .or_else(|| lower.strip_prefix("www"))
        .unwrap_or(&lower);
    rest.trim_start_matches('.').is_empty()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<br />"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{InsertMode, OrderedList, parse};

    #[test]
    fn test_render_numbered_entries() {
        let mut list = OrderedList::new();
        list.add("Smith 2020", InsertMode::Append);
        list.add("Jones 2019", InsertMode::Prepend);

        assert_eq!(
            render_plain(list.items()),
            "[1] Jones 2019\n\n[2] Smith 2020"
        );
    }

    #[test]
    fn test_render_empty_list() {
        let export = render(&[], true);
        assert!(export.is_empty());
        assert_eq!(export.html.as_deref(), Some(""));
    }

    #[test]
    fn test_plain_text_unaffected_by_links() {
        let list = OrderedList::from_contents(["See https://example.org/a.", "Plain"]);
        let with = render(list.items(), true);
        let without = render(list.items(), false);

        assert_eq!(with.plain, without.plain);
        assert!(without.html.is_none());
    }

    #[test]
    fn test_html_wraps_urls_in_anchors() {
        let list = OrderedList::from_contents(["Doe (2021). https://doi.org/10.1/x."]);
        let html = render(list.items(), true).html.unwrap();

        assert_eq!(
            html,
            "[1] Doe (2021). <a href=\"https://doi.org/10.1/x\">https://doi.org/10.1/x</a>."
        );
    }

    #[test]
    fn test_html_bare_www_gets_scheme_and_text_is_escaped() {
        let list = OrderedList::from_contents(["A & B <www.example.com>", "Second"]);
        let html = render(list.items(), true).html.unwrap();

        assert_eq!(
            html,
            "[1] A &amp; B &lt;<a href=\"http://www.example.com\">www.example.com</a>&gt;<br /><br />[2] Second"
        );
    }

    #[test]
    fn test_html_keeps_balanced_parentheses_in_url() {
        let list = OrderedList::from_contents([
            "See https://en.wikipedia.org/wiki/Foo_(bar).",
            "(https://example.org/a)",
        ]);
        let html = render(list.items(), true).html.unwrap();

        assert!(html.contains(
            "<a href=\"https://en.wikipedia.org/wiki/Foo_(bar)\">https://en.wikipedia.org/wiki/Foo_(bar)</a>."
        ));
        assert!(html.contains("(<a href=\"https://example.org/a\">https://example.org/a</a>)"));
    }

    #[test]
    fn test_html_skips_bare_scheme_or_www() {
        let list = OrderedList::from_contents(["Visit www.. or https://. soon"]);
        let html = render(list.items(), true).html.unwrap();

        assert_eq!(html, "[1] Visit www.. or https://. soon");
    }

    #[test]
    fn test_round_trip_through_import() {
        let original = vec![
            "Smith, J. (2020). Title.\nJournal 4(2).".to_string(),
            "[7] keeps inner marker".to_string(),
            "https://example.org".to_string(),
            "Smith, J.\n \nJournal".to_string(),
        ];
        let list = OrderedList::from_contents(original.clone());

        let reparsed = parse(&render_plain(list.items()), InsertMode::Append);
        let contents: Vec<String> = reparsed.into_iter().map(ReferenceItem::into_content).collect();

        assert_eq!(contents, original);
    }

    #[test]
    fn test_render_is_deterministic() {
        let list = OrderedList::from_contents(["A", "B"]);
        assert_eq!(render(list.items(), true), render(list.items(), true));
    }
}
