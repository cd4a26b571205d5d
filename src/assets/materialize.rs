// src/assets/materialize.rs
// =============================================================================
// Downloading README images so the note works offline.
//
// Steps:
// 1. Find every absolute image URL in the text
//    - Markdown images with pulldown-cmark (it knows the ![..](..) rules)
//    - <img src> tags with scraper (it knows HTML attribute quoting)
//    - The rewriter's pattern scan, for images pulldown-cmark swallows into
//      a raw HTML block (an image line right after </p>, for example)
// 2. Give each URL a file name from its last path segment
// 3. Download all of them concurrently and write them to assets/
// 4. One by one, replace each URL in the text with its local path
//
// Step 3 is the only concurrent part. Step 4 works on one String owned by
// this function, after all downloads are done, so there's nothing to lock.
//
// A failed download or write skips that image only: it keeps its remote URL
// and the failure is logged as a warning.
//
// Rust concepts:
// - Streams: buffer_unordered runs N downloads at a time
// - HashSet: de-duplicating URLs and file names
// =============================================================================

use super::rewrite::{find_image_urls, AssetReference};
use super::store::{filename_from_url, AssetStore};
use crate::error::ImportError;
use crate::github::{classify_url, GitHubClient, UrlKind};
use futures::stream::{self, StreamExt};
use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;

/// What happened to the images of one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeSummary {
    /// Remote URL -> local path, for every image now stored locally
    pub downloaded: Vec<AssetReference>,
    /// Remote URLs left in place because fetching or storing failed
    pub failed: Vec<String>,
}

// A URL and the file name it will be stored under
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedAsset {
    url: String,
    file_name: String,
}

pub struct AssetMaterializer {
    client: GitHubClient,
    store: AssetStore,
    concurrency: usize,
}

impl AssetMaterializer {
    pub fn new(client: GitHubClient, store: AssetStore, concurrency: usize) -> Self {
        Self {
            client,
            store,
            concurrency: concurrency.max(1),
        }
    }

    // Downloads one asset and stores it as `file_name`
    //
    // Returns: the local path, e.g. "assets/logo.png"
    pub async fn download_and_store(
        &self,
        asset_url: &str,
        file_name: &str,
    ) -> Result<String, ImportError> {
        let bytes = self.client.fetch_bytes(asset_url).await?;
        self.store.write(file_name, &bytes).await
    }

    // Downloads every absolute image in `content` and points the text at
    // the local copies
    pub async fn materialize(&self, content: &str) -> (String, MaterializeSummary) {
        let planned = plan_assets(&collect_asset_urls(content));
        tracing::debug!(count = planned.len(), "materializing assets");

        let downloads = planned.into_iter().map(|asset| async move {
            let result = self.download_and_store(&asset.url, &asset.file_name).await;
            (asset, result)
        });

        let results: Vec<(PlannedAsset, Result<String, ImportError>)> = stream::iter(downloads)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = MaterializeSummary::default();
        let mut stored = Vec::new();
        for (asset, result) in results {
            match result {
                Ok(local_path) => stored.push((asset.url, local_path)),
                Err(e) => {
                    tracing::warn!(url = %asset.url, stage = e.stage(), error = %e, "skipping asset");
                    summary.failed.push(asset.url);
                }
            }
        }

        // Longest first, so a URL that is a prefix of another one can't
        // clobber part of it.
        stored.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        summary.failed.sort();

        let mut content = content.to_string();
        for (url, local_path) in stored {
            content = content.replace(&url, &local_path);
            summary.downloaded.push(AssetReference {
                original_url: url,
                resolved_url: local_path,
            });
        }

        (content, summary)
    }
}

// Absolute image URLs from both syntaxes, first occurrence order, no repeats
fn collect_asset_urls(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    markdown_image_urls(content)
        .into_iter()
        .chain(html_image_urls(content))
        .chain(find_image_urls(content))
        .filter(|url| classify_url(url) == UrlKind::Absolute)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn markdown_image_urls(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Image(_link_type, dest_url, _title)) => Some(dest_url.to_string()),
            _ => None,
        })
        .collect()
}

fn html_image_urls(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };
    let document = Html::parse_fragment(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::to_string)
        .collect()
}

// Picks a unique file name per URL: logo.png, logo-1.png, logo-2.png, ...
// A suffixed name is skipped when another URL already has it.
fn plan_assets(urls: &[String]) -> Vec<PlannedAsset> {
    let mut taken: HashSet<String> = HashSet::new();

    urls.iter()
        .map(|url| {
            let base = filename_from_url(url).unwrap_or_else(|| "asset".to_string());
            let mut file_name = base.clone();
            let mut n = 0;
            while taken.contains(&file_name) {
                n += 1;
                file_name = with_suffix(&base, n);
            }
            taken.insert(file_name.clone());
            PlannedAsset {
                url: url.clone(),
                file_name,
            }
        })
        .collect()
}

fn with_suffix(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, n, ext),
        _ => format!("{}-{}", name, n),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why two parsers for finding images?
//    - pulldown-cmark understands Markdown but sees <img> as opaque HTML
//    - scraper understands HTML but sees ![..](..) as plain text
//    - Running both and de-duplicating covers READMEs that mix the two
//    - A plain pattern scan runs last: Markdown that directly follows an
//      HTML block is raw HTML to pulldown-cmark, so it never sees it
//
// 2. What is buffer_unordered?
//    - Takes a stream of futures and polls up to N of them at once
//    - Results come back in completion order, not input order
//    - That's fine here: we sort before touching the text
//
// 3. Why `async move` inside the map?
//    - Each future needs its own PlannedAsset, so it takes ownership
//    - `self` is only a reference, so moving it just copies the pointer
// -----------------------------------------------------------------------------
