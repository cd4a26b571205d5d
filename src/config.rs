// src/config.rs
// =============================================================================
// Settings for an import, read from a TOML file.
//
// Lookup order:
// 1. The file passed with --config
// 2. readme-importer.toml in the current directory, if it exists
// 3. Built-in defaults
//
// Every field has a default, so a config file only needs the keys you want
// to change. A few settings can also be overridden from the command line.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "readme-importer.toml";

/// What to do with images once their URLs are absolute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    /// Point images at raw files on the repository host
    #[default]
    Rewrite,
    /// Also download every image into the assets folder and link locally
    Materialize,
}

/// Which HTML sanitizer cleans HTML lines inside README blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizerKind {
    #[default]
    Default,
    Passthrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Base of the repository content API.
    pub api_base: String,
    /// Base of the human-facing repository pages (used for image links).
    pub web_base: String,
    /// Branch that relative image links are resolved against.
    pub branch: String,
    pub asset_mode: AssetMode,
    /// Folder (under `storage_root`) that downloaded images land in.
    pub assets_dir: String,
    /// Root of the managed storage, usually the notes vault.
    pub storage_root: PathBuf,
    pub timeout_secs: u64,
    /// Upper bound on simultaneous image downloads.
    pub max_concurrent_downloads: usize,
    pub user_agent: String,
    /// Optional API token, sent as a bearer token.
    pub token: Option<String>,
    pub sanitizer: SanitizerKind,
    /// Remove <div> wrappers that only exist for layout.
    pub strip_layout_tags: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            web_base: "https://github.com".to_string(),
            branch: "main".to_string(),
            asset_mode: AssetMode::Rewrite,
            assets_dir: "assets".to_string(),
            storage_root: PathBuf::from("."),
            timeout_secs: 10,
            max_concurrent_downloads: 8,
            user_agent: concat!("readme-importer/", env!("CARGO_PKG_VERSION")).to_string(),
            token: None,
            sanitizer: SanitizerKind::Default,
            strip_layout_tags: true,
        }
    }
}

impl ImporterConfig {
    /// Load from an explicit path, from the working directory, or fall back
    /// to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    tracing::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: ImporterConfig = toml::from_str(&data)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }
}
