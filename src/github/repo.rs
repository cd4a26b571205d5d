// src/github/repo.rs
// =============================================================================
// This module knows how to talk about repositories and URLs.
//
// It does three small jobs:
// - Turn a repository URL into an owner/name pair
// - Decide whether a URL is absolute (http/https) or relative
// - Resolve a relative URL against a base URL, the way a browser would
//
// None of these ever fail loudly. A bad repository URL produces a reference
// with empty fields (the fetcher rejects it later), and a URL that can't be
// resolved is handed back unchanged with a warning in the log.
//
// Rust concepts:
// - Structs with derived traits (Debug, Clone, PartialEq)
// - Enums for a closed set of answers (Absolute or Relative)
// - Iterators: rev(), filter() and next() to walk path segments backwards
// =============================================================================

use serde::Serialize;
use url::Url;

/// An owner/name pair such as `rust-lang/rust`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    /// Both fields are present. Parsing never checks this, the fetcher does.
    pub fn is_well_formed(&self) -> bool {
        !self.owner.is_empty() && !self.name.is_empty()
    }

    /// The browsing path that relative README links are written against,
    /// e.g. `https://github.com/acme/widgets/blob/main/`.
    pub fn blob_base(&self, web_base: &str, branch: &str) -> String {
        format!(
            "{}/{}/{}/blob/{}/",
            web_base.trim_end_matches('/'),
            self.owner,
            self.name,
            branch
        )
    }
}

impl std::fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Whether a URL can be used as-is or needs a base to mean anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Absolute,
    Relative,
}

// Parses a repository URL into owner and name
//
// Takes the last two non-empty '/'-separated segments, so all of these work:
//   https://github.com/owner/repo
//   https://github.com/owner/repo/
//   http://github.com/owner/repo.git
//   github.com/owner/repo
//   owner/repo
//
// Anything with fewer than two segments gives empty fields instead of an
// error. We don't check the host at all.
pub fn parse_repository_reference(url: &str) -> RepositoryReference {
    let mut segments = url.trim().split('/').rev().filter(|s| !s.is_empty());

    let name = segments.next().unwrap_or_default();
    let owner = segments.next().unwrap_or_default();

    RepositoryReference {
        owner: owner.to_string(),
        name: name.trim_end_matches(".git").to_string(),
    }
}

// Absolute means "starts with http:// or https://", nothing more
//
// The check is case-sensitive on purpose: "HTTP://x" is treated as relative.
pub fn classify_url(url: &str) -> UrlKind {
    if url.starts_with("http://") || url.starts_with("https://") {
        UrlKind::Absolute
    } else {
        UrlKind::Relative
    }
}

// True when the string carries its own scheme (data:, mailto:, https:, ...)
//
// Such a URL is not a relative reference even when classify_url says
// Relative, so it must never be glued onto a base.
pub fn has_scheme(url: &str) -> bool {
    Url::parse(url).is_ok()
}

// Resolves `relative` against `base` (RFC 3986 reference resolution)
//
// Examples with base "https://github.com/acme/widgets/blob/main/":
//   "images/logo.png"   -> ".../blob/main/images/logo.png"
//   "./docs/a.svg"      -> ".../blob/main/docs/a.svg"
//   "../x.png"          -> "https://github.com/acme/widgets/blob/x.png"
//
// If either side can't be parsed we log a warning and return `relative`
// unchanged so the rest of the pipeline can keep going.
pub fn resolve_against_base(relative: &str, base: &str) -> String {
    match try_resolve(relative, base) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(url = relative, base, error = %e, "could not resolve relative URL");
            relative.to_string()
        }
    }
}

fn try_resolve(relative: &str, base: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(base)?;
    Ok(base.join(relative)?.to_string())
}
