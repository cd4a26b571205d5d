// src/normalize/interleave.rs
// =============================================================================
// Untangling Markdown that lives inside HTML blocks.
//
// READMEs love this pattern:
//
//     <p align="center">
//     # My Project
//     ![build](badge.svg)
//     Some words
//     </p>
//
// Inside an HTML block, most Markdown renderers treat the lines as literal
// HTML, so the heading and the image never render. We fix that with one
// pass over the lines, remembering a single open tag:
//
//   Outside            -- line opens <T> -------------------> InsideHtml(T)
//   InsideHtml(T)      -- line closes T ---------------------> Outside
//   InsideHtml(T)      -- Markdown line, emit </T> first ----> InsideHtmlMarkdown(T)
//   InsideHtmlMarkdown -- non-Markdown line, emit <T> first -> InsideHtml(T)
//   InsideHtmlMarkdown -- line closes T (already emitted) ---> Outside
//
// A line "looks like Markdown" when its first non-whitespace character is
// one of  # - * > [ ! ` |  or a digit 1-9. That's the only lookahead.
//
// Limitations, on purpose: no tag stack (a nested <div> inside a <div> ends
// the block at the first </div>), and an unclosed tag at the end of the
// input is simply left open.
// =============================================================================

use super::sanitize::Sanitize;
use regex::Regex;
use std::sync::LazyLock;

// An opening tag at the very start of a line (leading spaces allowed). The
// name must be followed by whitespace, `/` or `>`, so autolinks such as
// <https://x.org> or <me@x.org> are not tags.
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(<([a-zA-Z][a-zA-Z0-9-]*)(?:\s[^>]*)?/?>)")
        .expect("OPEN_TAG_RE: hardcoded regex is valid")
});

static CLOSE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</([a-zA-Z][a-zA-Z0-9-]*)\s*>").expect("CLOSE_TAG_RE: hardcoded regex is valid")
});

// Elements that never have a closing tag, so they can't open a block.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const MARKDOWN_INDICATORS: &[char] = &['#', '-', '*', '>', '[', '!', '`', '|'];

/// The tag the scan is currently inside of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    /// Lowercased element name, e.g. `p`
    pub name: String,
    /// The opening tag exactly as written, e.g. `<p align="center">`,
    /// reused when the tag has to be re-opened.
    pub opening: String,
}

/// Scan state, reset for every document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagState {
    pub current_open_tag: Option<OpenTag>,
    pub in_markdown_mode: bool,
}

/// What a single line means given the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSegment {
    /// Opens a block we should track
    HtmlOpen(OpenTag),
    /// Closes the tracked block
    HtmlClose(String),
    /// Markdown inside a tracked block
    MarkdownContent,
    /// Anything else inside a tracked block
    HtmlContent,
    /// Outside any block, or a blank line
    Plain,
}

// Decides what a line is, without changing any state
pub fn classify_line(line: &str, state: &TagState) -> LineSegment {
    match &state.current_open_tag {
        None => match opening_tag(line) {
            Some(tag) => LineSegment::HtmlOpen(tag),
            None => LineSegment::Plain,
        },
        Some(tag) => {
            if closes_tag(line, &tag.name) {
                LineSegment::HtmlClose(tag.name.clone())
            } else if line.trim().is_empty() {
                LineSegment::Plain
            } else if starts_like_markdown(line) {
                LineSegment::MarkdownContent
            } else {
                LineSegment::HtmlContent
            }
        }
    }
}

// Runs the scan over a whole document
//
// Line endings are preserved: we split on '\n' and join with '\n', so a
// trailing newline (an empty last "line") survives, and '\r' stays attached
// to the line it came with.
pub fn resolve_interleaving(content: &str, sanitizer: &dyn Sanitize) -> String {
    let mut state = TagState::default();
    let mut out: Vec<String> = Vec::new();

    for line in content.split('\n') {
        match classify_line(line, &state) {
            LineSegment::Plain => out.push(line.to_string()),

            LineSegment::HtmlOpen(tag) => {
                out.push(line.to_string());
                state.current_open_tag = Some(tag);
                state.in_markdown_mode = false;
            }

            LineSegment::HtmlClose(name) => {
                if state.in_markdown_mode {
                    // </name> was already emitted when Markdown started.
                    let rest = remove_close_tag(line, &name);
                    if !rest.trim().is_empty() {
                        out.push(rest);
                    }
                } else {
                    out.push(line.to_string());
                }
                state = TagState::default();
            }

            LineSegment::MarkdownContent => {
                if !state.in_markdown_mode {
                    if let Some(tag) = &state.current_open_tag {
                        out.push(format!("</{}>", tag.name));
                    }
                    state.in_markdown_mode = true;
                }
                out.push(line.to_string());
            }

            LineSegment::HtmlContent => {
                if state.in_markdown_mode {
                    if let Some(tag) = &state.current_open_tag {
                        out.push(tag.opening.clone());
                    }
                    state.in_markdown_mode = false;
                }
                out.push(sanitizer.sanitize(line));
            }
        }
    }

    if let Some(tag) = &state.current_open_tag {
        tracing::debug!(tag = %tag.name, "input ended inside an open HTML block");
    }

    out.join("\n")
}

// Some(tag) when the line starts with an opening tag that starts a block:
// not a void element, not self-closing, and not closed again on the same line.
fn opening_tag(line: &str) -> Option<OpenTag> {
    let caps = OPEN_TAG_RE.captures(line)?;
    let opening = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str().to_ascii_lowercase();

    if VOID_ELEMENTS.contains(&name.as_str()) || opening.ends_with("/>") {
        return None;
    }
    if closes_tag(line, &name) {
        return None;
    }

    Some(OpenTag {
        name,
        opening: opening.to_string(),
    })
}

fn closes_tag(line: &str, name: &str) -> bool {
    CLOSE_TAG_RE
        .captures_iter(line)
        .any(|caps| caps[1].eq_ignore_ascii_case(name))
}

// Removes the first </name> from the line.
fn remove_close_tag(line: &str, name: &str) -> String {
    let found = CLOSE_TAG_RE
        .captures_iter(line)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(0));

    match found {
        Some(m) => format!("{}{}", &line[..m.start()], &line[m.end()..]),
        None => line.to_string(),
    }
}

fn starts_like_markdown(line: &str) -> bool {
    match line.trim_start().chars().next() {
        Some(c) => MARKDOWN_INDICATORS.contains(&c) || ('1'..='9').contains(&c),
        None => false,
    }
}
