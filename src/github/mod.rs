// src/github/mod.rs
// =============================================================================
// This module handles everything that talks about or to GitHub.
//
// Currently implements:
// - Parsing repository URLs into owner/name (repo.rs)
// - Classifying and resolving asset URLs (repo.rs)
// - Fetching the raw README and binary assets over HTTP (fetch.rs)
// =============================================================================

mod fetch;
mod repo;

pub use fetch::GitHubClient;
pub use repo::{
    classify_url, has_scheme, parse_repository_reference, resolve_against_base,
    RepositoryReference, UrlKind,
};
