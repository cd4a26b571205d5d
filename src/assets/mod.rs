// src/assets/mod.rs
// =============================================================================
// This module deals with the images a README points at.
//
// Submodules:
// - rewrite: relative image URLs -> absolute raw URLs on the repository host
// - materialize: absolute image URLs -> files in the local assets folder
// - store: the assets folder itself
//
// Which of the two a run uses is a config choice (asset_mode). Materializing
// always runs after rewriting, so it sees absolute URLs only.
// =============================================================================

mod materialize;
mod rewrite;
mod store;

pub use materialize::{AssetMaterializer, MaterializeSummary};
pub use rewrite::{find_image_urls, AssetReference, ImageRewriter};
pub use store::AssetStore;
