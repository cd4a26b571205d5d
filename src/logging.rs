// src/logging.rs
// =============================================================================
// Diagnostics setup. Everything goes to stderr through tracing-subscriber,
// filtered by RUST_LOG or the --verbose flag.
// =============================================================================

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins when set. Otherwise warnings from everything and info
/// from this crate, or debug with `--verbose`. Stdout is left alone for the
/// imported document and the JSON report.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "warn,readme_importer=debug"
    } else {
        "warn,readme_importer=info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    tracing::debug!("logging initialized");
    Ok(())
}
