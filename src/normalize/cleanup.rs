// src/normalize/cleanup.rs
// =============================================================================
// Small text-to-text passes that run after the interleave scan.
//
// - eliminate_empty_tags:   <span> </span> and friends disappear, repeatedly
// - normalize_line_breaks:  <br>, <br/>, <br /> become real newlines
// - strip_layout_tags:      <div ...> and </div> go, their content stays
//
// Each one leaves pure Markdown alone: if the patterns don't match, the
// output is the input.
// =============================================================================

use regex::{Captures, Regex};
use std::sync::LazyLock;

// An opening tag, only whitespace, then a closing tag. The regex crate has
// no backreferences, so the "same name" check happens in the replacer.
static EMPTY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)\b[^>]*>\s*</([a-zA-Z][a-zA-Z0-9-]*)\s*>")
        .expect("EMPTY_PAIR_RE: hardcoded regex is valid")
});

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("BR_RE: hardcoded regex is valid"));

static DIV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?div\b[^>]*>").expect("DIV_RE: hardcoded regex is valid"));

// Removes empty element pairs until nothing changes
//
// One pass is not enough: removing the inner pair of
// `<div><span></span></div>` leaves `<div></div>`, which the next pass
// removes. Every pass that changes anything makes the string shorter, so
// the loop always ends.
pub fn eliminate_empty_tags(content: &str) -> String {
    let mut current = content.to_string();
    let mut rounds = 0;

    loop {
        let next = EMPTY_PAIR_RE
            .replace_all(&current, |caps: &Captures| {
                if caps[1].eq_ignore_ascii_case(&caps[2]) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();

        if next == current {
            break;
        }
        current = next;
        rounds += 1;
    }

    if rounds > 0 {
        tracing::debug!(rounds, "removed empty tags");
    }
    current
}

// Turns HTML line breaks into newlines, which is what a Markdown editor
// shows as a break.
pub fn normalize_line_breaks(content: &str) -> String {
    BR_RE.replace_all(content, "\n").into_owned()
}

// Drops <div> wrappers. They only exist for alignment on the web page and
// stop the editor from rendering the Markdown inside them.
pub fn strip_layout_tags(content: &str) -> String {
    DIV_RE.replace_all(content, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_empty_tags_reach_fixed_point() {
        assert_eq!(eliminate_empty_tags("<div><span></span></div>"), "");
        assert_eq!(
            eliminate_empty_tags("a<p align=\"center\">\n  <b> </b>\n</p>b"),
            "ab"
        );
    }

    #[test]
    fn test_non_empty_tags_survive() {
        let input = "<p>text</p><span><img src=\"a.png\"></span>";
        assert_eq!(eliminate_empty_tags(input), input);
    }

    #[test]
    fn test_mismatched_pair_survives() {
        let input = "<p></span>";
        assert_eq!(eliminate_empty_tags(input), input);
    }

    #[test]
    fn test_case_insensitive_pair() {
        assert_eq!(eliminate_empty_tags("x<P></p>y"), "xy");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(normalize_line_breaks("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
        assert_eq!(normalize_line_breaks("<bridge>"), "<bridge>");
    }

    #[test]
    fn test_strip_layout_tags() {
        assert_eq!(
            strip_layout_tags("<div align=\"center\">\n# Title\n</div>"),
            "\n# Title\n"
        );
        assert_eq!(strip_layout_tags("<divider>"), "<divider>");
    }

    #[test]
    fn test_markdown_is_untouched() {
        let input = "# Title\n\n- [link](https://example.com)\n\n```rust\nfn main() {}\n```\n";
        assert_eq!(eliminate_empty_tags(input), input);
        assert_eq!(normalize_line_breaks(input), input);
        assert_eq!(strip_layout_tags(input), input);
    }
}
