// src/error.rs
// =============================================================================
// Typed errors for the import pipeline.
//
// Every stage of an import (fetch, asset storage, insertion) fails with an
// ImportError. The orchestrator catches them in exactly one place, logs the
// detail and shows the user a single generic message.
//
// Application plumbing (main, config loading) keeps using anyhow; these
// variants exist so the orchestrator can say which stage failed.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The repository URL did not yield both an owner and a name
    #[error("'{0}' does not look like a repository URL")]
    MalformedReference(String),

    /// The server answered with a non-2xx status
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request never got a response (DNS, TLS, timeout, ...)
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Creating the assets folder or writing a file failed
    #[error("could not write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished document could not be delivered to the insertion target
    #[error("could not insert README: {0}")]
    Insert(#[source] std::io::Error),
}

impl ImportError {
    /// Name of the pipeline stage that produced this error, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            ImportError::MalformedReference(_) => "parse",
            ImportError::Status { .. } | ImportError::Transport { .. } => "fetch",
            ImportError::Storage { .. } => "storage",
            ImportError::Insert(_) => "insert",
        }
    }
}
