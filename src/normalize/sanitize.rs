// src/normalize/sanitize.rs
// =============================================================================
// Cleaning up raw HTML lines before they reach the note.
//
// The interleave scan calls a sanitizer on every line it decides is HTML
// content. Anything implementing `Sanitize` will do; two are provided:
//
// - TagSanitizer (default): pattern based, works on a single line at a time
//   and never closes or reorders tags, so an `<a href=..>` on one line and
//   its `</a>` three lines later both survive.
// - Passthrough: leaves the line alone.
//
// Lines are fragments, so there is no DOM here: an HTML parser would close
// every tag left open on the line.
// =============================================================================

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Anything that can clean an HTML fragment.
pub trait Sanitize: Send + Sync {
    fn sanitize(&self, fragment: &str) -> String;
}

/// Leaves every fragment untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Sanitize for Passthrough {
    fn sanitize(&self, fragment: &str) -> String {
        fragment.to_string()
    }
}

// Elements whose content is never wanted in a note, removed with everything
// between their tags (when both tags are on the same line).
static DANGEROUS_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|iframe|object|embed|form)\b[^>]*>.*?</(script|style|iframe|object|embed|form)\s*>")
        .expect("DANGEROUS_BLOCK_RE: hardcoded regex is valid")
});

// Stray opening/closing/self-closing tokens of the same elements.
static DANGEROUS_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(script|style|iframe|object|embed|form|input|button|link|meta|base)\b[^>]*>")
        .expect("DANGEROUS_TAG_RE: hardcoded regex is valid")
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_RE: hardcoded regex is valid"));

// on*="..." / on*='...' / on*=bare inside a tag
static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("EVENT_ATTR_RE: hardcoded regex is valid")
});

// An opening tag with its attributes
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[a-zA-Z][^>]*>"#).expect("OPEN_TAG_RE: hardcoded regex is valid")
});

static JS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src)\s*=\s*(["'])\s*javascript:[^"']*(["'])"#)
        .expect("JS_URL_RE: hardcoded regex is valid")
});

/// Removes scripts, styles, embedded frames, forms, comments, event handler
/// attributes and `javascript:` links. Every other tag is kept as written.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagSanitizer;

impl Sanitize for TagSanitizer {
    fn sanitize(&self, fragment: &str) -> String {
        let cleaned = DANGEROUS_BLOCK_RE.replace_all(fragment, "");
        let cleaned = DANGEROUS_TAG_RE.replace_all(&cleaned, "");
        let cleaned = COMMENT_RE.replace_all(&cleaned, "");
        let cleaned = OPEN_TAG_RE.replace_all(&cleaned, |caps: &Captures| {
            EVENT_ATTR_RE.replace_all(&caps[0], "").into_owned()
        });
        let cleaned = JS_URL_RE.replace_all(&cleaned, "$1=$2#$3");
        cleaned.into_owned()
    }
}
