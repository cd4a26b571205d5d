// src/assets/rewrite.rs
// =============================================================================
// Making relative image links work outside the repository.
//
// A README written for GitHub can say ![logo](images/logo.png) because
// GitHub renders it next to the file. Once the text lives in a note, that
// path points nowhere. We rewrite it to the file's page on GitHub plus
// `?raw=true`, which makes GitHub hand back the image bytes:
//
//   images/logo.png
//   -> https://github.com/acme/widgets/blob/main/images/logo.png?raw=true
//
// Two independent scans find images:
// - Markdown:  ![alt](url)  and  ![alt](url "title")
// - HTML:      <img ... src="url" ...>
//
// Absolute URLs (http/https) and URLs with another scheme (data:, mailto:)
// are left alone, which also makes the rewrite idempotent: its own output
// is absolute.
// =============================================================================

use crate::github::{classify_url, has_scheme, resolve_against_base, RepositoryReference, UrlKind};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

static MARKDOWN_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]]*\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
        .expect("MARKDOWN_IMAGE_RE: hardcoded regex is valid")
});

static HTML_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']*)["']"#)
        .expect("HTML_IMAGE_RE: hardcoded regex is valid")
});

const RAW_SUFFIX: &str = "raw=true";

/// One image URL we changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReference {
    pub original_url: String,
    pub resolved_url: String,
}

/// Rewrites relative image URLs against one repository's browsing path
#[derive(Debug, Clone)]
pub struct ImageRewriter {
    base: String,
}

impl ImageRewriter {
    pub fn new(reference: &RepositoryReference, web_base: &str, branch: &str) -> Self {
        Self {
            base: reference.blob_base(web_base, branch),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // Rewrites both image forms and reports every URL that changed
    //
    // Returns: (new content, list of rewritten references in the order the
    // scans found them, Markdown first)
    pub fn rewrite(&self, content: &str) -> (String, Vec<AssetReference>) {
        let mut rewritten = Vec::new();

        let content = replace_url_group(&MARKDOWN_IMAGE_RE, content, |url| {
            self.rewrite_url(url, &mut rewritten)
        });
        let content = replace_url_group(&HTML_IMAGE_RE, &content, |url| {
            self.rewrite_url(url, &mut rewritten)
        });

        (content, rewritten)
    }

    fn rewrite_url(&self, url: &str, rewritten: &mut Vec<AssetReference>) -> Option<String> {
        if !needs_rewrite(url) {
            return None;
        }

        let resolved = resolve_against_base(url, &self.base);
        if resolved == url {
            // Resolution failed and has already been logged.
            return None;
        }

        let separator = if resolved.contains('?') { '&' } else { '?' };
        let resolved = format!("{}{}{}", resolved, separator, RAW_SUFFIX);

        rewritten.push(AssetReference {
            original_url: url.to_string(),
            resolved_url: resolved.clone(),
        });
        Some(resolved)
    }
}

// Every image URL in the text, both forms, in order of appearance per form.
pub fn find_image_urls(content: &str) -> Vec<String> {
    MARKDOWN_IMAGE_RE
        .captures_iter(content)
        .chain(HTML_IMAGE_RE.captures_iter(content))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn needs_rewrite(url: &str) -> bool {
    classify_url(url) == UrlKind::Relative
        && !url.is_empty()
        && !url.starts_with('#')
        && !has_scheme(url)
}

// Runs `regex` over `content` and swaps capture group 1 (the URL) for
// whatever `f` returns. `None` keeps the match as it was.
fn replace_url_group<F>(regex: &Regex, content: &str, mut f: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    regex
        .replace_all(content, |caps: &Captures| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let Some(url) = caps.get(1) else {
                return whole.to_string();
            };
            let Some(new_url) = f(url.as_str()) else {
                return whole.to_string();
            };

            let start = caps.get(0).map(|m| m.start()).unwrap_or_default();
            let (before, after) = (
                &whole[..url.start() - start],
                &whole[url.end() - start..],
            );
            format!("{}{}{}", before, new_url, after)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::parse_repository_reference;

    fn rewrite(content: &str) -> String {
        let reference = parse_repository_reference("https://github.com/acme/widgets");
        ImageRewriter::new(&reference, "https://github.com", "main")
            .rewrite(content)
            .0
    }

    #[test]
    fn test_relative_markdown_image() {
        assert_eq!(
            rewrite("![logo](images/logo.png)"),
            "![logo](https://github.com/acme/widgets/blob/main/images/logo.png?raw=true)"
        );
    }

    #[test]
    fn test_absolute_markdown_image_unchanged() {
        let input = "![logo](https://cdn.example.com/logo.png)";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_markdown_image_with_title() {
        assert_eq!(
            rewrite(r#"![a](./a.png "The A")"#),
            r#"![a](https://github.com/acme/widgets/blob/main/a.png?raw=true "The A")"#
        );
    }

    #[test]
    fn test_html_image() {
        assert_eq!(
            rewrite(r#"<img width="100" src='docs/shot.gif' alt="x">"#),
            r#"<img width="100" src='https://github.com/acme/widgets/blob/main/docs/shot.gif?raw=true' alt="x">"#
        );
        let input = r#"<img src="http://example.com/a.png">"#;
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_badge_inside_link() {
        assert_eq!(
            rewrite("[![ci](badge.svg)](https://ci.example.com)"),
            "[![ci](https://github.com/acme/widgets/blob/main/badge.svg?raw=true)](https://ci.example.com)"
        );
    }

    #[test]
    fn test_plain_links_are_not_images() {
        let input = "[docs](docs/README.md)";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_other_schemes_untouched() {
        let input = "![dot](data:image/gif;base64,R0lGOD) <img src=\"#top\">";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_existing_query_gets_ampersand() {
        assert_eq!(
            rewrite("![a](a.png?v=2)"),
            "![a](https://github.com/acme/widgets/blob/main/a.png?v=2&raw=true)"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let input = "# W\n![a](a.png)\n<img src=\"b/c.png\">\n![d](https://x.org/d.png)\n";
        let once = rewrite(input);
        assert_eq!(rewrite(&once), once);
    }

    #[test]
    fn test_report_lists_rewrites() {
        let reference = parse_repository_reference("acme/widgets");
        let rewriter = ImageRewriter::new(&reference, "https://github.com", "dev");
        let (_, refs) = rewriter.rewrite("![a](a.png) <img src=\"b.png\"> ![c](https://c.org/c.png)");
        assert_eq!(
            refs,
            vec![
                AssetReference {
                    original_url: "a.png".to_string(),
                    resolved_url: "https://github.com/acme/widgets/blob/dev/a.png?raw=true"
                        .to_string(),
                },
                AssetReference {
                    original_url: "b.png".to_string(),
                    resolved_url: "https://github.com/acme/widgets/blob/dev/b.png?raw=true"
                        .to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_find_image_urls() {
        let urls = find_image_urls("![a](a.png) text <IMG SRC=\"b.png\"> [l](l.md)");
        assert_eq!(urls, vec!["a.png", "b.png"]);
    }
}
