// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load the config file
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = imported, 1 = import failed, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod assets;    // src/assets/ - image URL rewriting and downloading
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - TOML settings
mod editor;    // src/editor.rs - where the README goes, notifications, prompt
mod error;     // src/error.rs - typed pipeline errors
mod github;    // src/github/ - repository URLs and HTTP fetching
mod import;    // src/import.rs - the pipeline itself
mod logging;   // src/logging.rs - tracing setup
mod normalize; // src/normalize/ - Markdown/HTML clean-up

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Overrides};
use config::ImporterConfig;
use editor::{ConsoleNotifier, Cursor, FileDocument, InsertionTarget, StdoutDocument};
use import::{ImportRequest, Importer};
use std::io::{self, Read};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Unexpected errors (bad config, unreadable input) exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = ImporterConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            repo_url,
            output,
            line,
            json,
            overrides,
        } => handle_import(config, repo_url, output, line, json, &overrides).await,
        Commands::Normalize {
            file,
            repo,
            overrides,
        } => handle_normalize(config, file, &repo, &overrides),
    }
}

// Handles the 'import' subcommand
//
// Without a URL on the command line we ask for one. The prompt goes to
// stderr because stdout may be carrying the document.
async fn handle_import(
    config: ImporterConfig,
    repo_url: Option<String>,
    output: Option<PathBuf>,
    line: Option<usize>,
    json: bool,
    overrides: &Overrides,
) -> Result<i32> {
    let config = overrides.apply(config);

    let request = match repo_url {
        Some(url) => ImportRequest::new(url),
        None => match editor::prompt_for_request(io::stdin().lock(), io::stderr())? {
            Some(request) => request,
            None => {
                eprintln!("No repository URL entered, nothing imported");
                return Ok(1);
            }
        },
    };

    let mut target: Box<dyn InsertionTarget> = match output {
        Some(path) => {
            let cursor = line.map(Cursor::Line).unwrap_or_default();
            Box::new(FileDocument::new(path, cursor))
        }
        None => Box::new(StdoutDocument),
    };

    let importer = Importer::new(config)?;
    let report = importer
        .import_readme(&request, target.as_mut(), &ConsoleNotifier)
        .await;

    match report {
        Some(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(0)
        }
        None => Ok(1),
    }
}

// Handles the 'normalize' subcommand: no network, no downloads
fn handle_normalize(
    config: ImporterConfig,
    file: Option<PathBuf>,
    repo: &str,
    overrides: &Overrides,
) -> Result<i32> {
    let config = overrides.apply(config);

    let raw = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let reference = github::parse_repository_reference(repo);
    let importer = Importer::new(config)?;
    let (text, rewritten) = importer.transform(&raw, &reference);
    tracing::info!(repository = %reference, rewritten = rewritten.len(), "normalized README");

    StdoutDocument.replace_selection(&text)?;
    Ok(0)
}
