// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - import:     fetch a README from GitHub and put it into a note
// - normalize:  run the same clean-up on a README you already have
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - Option<T>: for arguments the user may leave out
// =============================================================================

use crate::config::{AssetMode, ImporterConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "readme-importer",
    version,
    about = "Import GitHub READMEs into Markdown notes",
    long_about = "readme-importer fetches a repository's README, untangles the Markdown hidden \
                  inside HTML blocks and fixes relative image links so they still work in \
                  your notes. Images can optionally be downloaded next to the note."
)]
pub struct Cli {
    /// Config file (defaults to ./readme-importer.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more detail to stderr (same as RUST_LOG=readme_importer=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a repository's README
    ///
    /// Example: readme-importer import https://github.com/rust-lang/rust --output notes/rust.md
    Import {
        /// Repository URL (e.g., https://github.com/user/repo)
        ///
        /// Leave it out to be asked for it.
        repo_url: Option<String>,

        /// Note to insert the README into (printed to stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Insert before this 1-based line instead of appending
        #[arg(long, requires = "output")]
        line: Option<usize>,

        /// Print an import summary as JSON on stdout (needs --output)
        #[arg(long, requires = "output")]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Normalize a local README file (or stdin) and print the result
    ///
    /// Example: readme-importer normalize README.md --repo acme/widgets
    Normalize {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,

        /// Repository the README belongs to, used to resolve relative images
        #[arg(long)]
        repo: String,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Flags that win over the config file
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// How to treat images: keep them remote or download them
    #[arg(long, value_enum)]
    pub mode: Option<AssetMode>,

    /// Branch that relative image links point at
    #[arg(long)]
    pub branch: Option<String>,

    /// Folder that `assets/` is created in when downloading images
    #[arg(long)]
    pub storage_root: Option<PathBuf>,
}

impl Overrides {
    // Applies whatever flags were given on top of the loaded config
    pub fn apply(&self, mut config: ImporterConfig) -> ImporterConfig {
        if let Some(mode) = self.mode {
            config.asset_mode = mode;
        }
        if let Some(branch) = &self.branch {
            config.branch = branch.clone();
        }
        if let Some(root) = &self.storage_root {
            config.storage_root = root.clone();
        }
        config
    }
}
